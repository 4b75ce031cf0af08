//! Per-encounter combat state wrapped around one [`Actor`].

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::actor::Actor;
use crate::command::CombatCommand;
use crate::env::{ArmorCategory, Dice, RngOracle};
use crate::status::StatusFlags;
use crate::types::{Alliance, CharacterId, CombatantId, Participant, Timestamp};

/// One participant's combat-only state inside a [`crate::Combat`].
///
/// A combatant has no lifetime of its own: it is created when its actor joins
/// an encounter and dropped with the encounter.
#[derive(Clone)]
pub struct Combatant {
    id: CombatantId,
    actor: Actor,
    alliance: Alliance,
    initiative: i32,

    command_queue: VecDeque<Arc<dyn CombatCommand>>,
    current_command: Option<Arc<dyn CombatCommand>>,

    global_cooldown_until: Timestamp,
    parry_cooldown_until: Timestamp,
    ability_cooldowns: HashMap<&'static str, Timestamp>,

    attacks_remaining: u32,
    acted_this_round: bool,
    active: bool,
    entered_at: Timestamp,

    status: StatusFlags,
    slowed_this_round: bool,
    pending_ripostes: u32,

    armor_damage: BTreeMap<ArmorCategory, i32>,
}

impl Combatant {
    pub fn new(id: CombatantId, actor: Actor, alliance: Alliance, entered_at: Timestamp) -> Self {
        Self {
            id,
            actor,
            alliance,
            initiative: 0,
            command_queue: VecDeque::new(),
            current_command: None,
            global_cooldown_until: Timestamp::ZERO,
            parry_cooldown_until: Timestamp::ZERO,
            ability_cooldowns: HashMap::new(),
            attacks_remaining: 1,
            acted_this_round: false,
            active: true,
            entered_at,
            status: StatusFlags::empty(),
            slowed_this_round: false,
            pending_ripostes: 0,
            armor_damage: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn name(&self) -> &str {
        self.actor.name()
    }

    pub fn participant(&self) -> Participant {
        self.actor.participant()
    }

    pub fn is_player(&self) -> bool {
        self.actor.is_player()
    }

    pub fn is_npc(&self) -> bool {
        self.actor.is_npc()
    }

    pub fn character_id(&self) -> Option<CharacterId> {
        self.actor.character_id()
    }

    pub fn level(&self) -> i32 {
        self.actor.combat_level()
    }

    pub fn entered_at(&self) -> Timestamp {
        self.entered_at
    }

    // ========================================================================
    // Alliance & initiative
    // ========================================================================

    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    pub fn set_alliance(&mut self, alliance: Alliance) {
        self.alliance = alliance;
    }

    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        self.alliance != other.alliance
    }

    pub fn is_allied_with(&self, other: &Combatant) -> bool {
        self.alliance == other.alliance
    }

    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    pub fn set_initiative(&mut self, initiative: i32) {
        self.initiative = initiative;
    }

    /// Rolls `d20 + DEX modifier` and stores it.
    pub fn roll_initiative(&mut self, dice: &mut Dice, rng: &dyn RngOracle) -> i32 {
        let roll = dice.d20(rng, self.id) as i32;
        self.initiative = roll + self.actor.stats().dex_mod();
        self.initiative
    }

    // ========================================================================
    // Command queue
    // ========================================================================

    pub fn queue_command(&mut self, command: Arc<dyn CombatCommand>) {
        self.command_queue.push_back(command);
    }

    pub fn poll_next_command(&mut self) -> Option<Arc<dyn CombatCommand>> {
        self.command_queue.pop_front()
    }

    pub fn peek_next_command(&self) -> Option<&Arc<dyn CombatCommand>> {
        self.command_queue.front()
    }

    pub fn queued_commands(&self) -> impl Iterator<Item = &Arc<dyn CombatCommand>> {
        self.command_queue.iter()
    }

    pub fn remove_queued_command(&mut self, index: usize) -> Option<Arc<dyn CombatCommand>> {
        self.command_queue.remove(index)
    }

    pub fn clear_command_queue(&mut self) {
        self.command_queue.clear();
    }

    pub fn has_queued_commands(&self) -> bool {
        !self.command_queue.is_empty()
    }

    pub fn queued_command_count(&self) -> usize {
        self.command_queue.len()
    }

    pub fn current_command(&self) -> Option<&Arc<dyn CombatCommand>> {
        self.current_command.as_ref()
    }

    pub fn set_current_command(&mut self, command: Option<Arc<dyn CombatCommand>>) {
        self.current_command = command;
    }

    // ========================================================================
    // Cooldowns
    // ========================================================================

    pub fn global_cooldown_until(&self) -> Timestamp {
        self.global_cooldown_until
    }

    pub fn set_global_cooldown_until(&mut self, until: Timestamp) {
        self.global_cooldown_until = until;
    }

    pub fn is_on_global_cooldown(&self, now: Timestamp) -> bool {
        now < self.global_cooldown_until
    }

    pub fn global_cooldown_remaining(&self, now: Timestamp) -> u64 {
        self.global_cooldown_until.saturating_since(now)
    }

    pub fn parry_cooldown_until(&self) -> Timestamp {
        self.parry_cooldown_until
    }

    pub fn set_parry_cooldown_until(&mut self, until: Timestamp) {
        self.parry_cooldown_until = until;
    }

    pub fn is_parry_on_cooldown(&self, now: Timestamp) -> bool {
        now < self.parry_cooldown_until
    }

    pub fn parry_cooldown_remaining(&self, now: Timestamp) -> u64 {
        self.parry_cooldown_until.saturating_since(now)
    }

    /// End of the named ability's cooldown, or [`Timestamp::ZERO`] if it was
    /// never used.
    pub fn ability_cooldown(&self, ability: &str) -> Timestamp {
        self.ability_cooldowns
            .get(ability)
            .copied()
            .unwrap_or(Timestamp::ZERO)
    }

    pub fn set_ability_cooldown(&mut self, ability: &'static str, until: Timestamp) {
        self.ability_cooldowns.insert(ability, until);
    }

    // ========================================================================
    // Round state
    // ========================================================================

    pub fn attacks_remaining(&self) -> u32 {
        self.attacks_remaining
    }

    pub fn set_attacks_remaining(&mut self, attacks: u32) {
        self.attacks_remaining = attacks;
    }

    pub fn decrement_attacks_remaining(&mut self) {
        self.attacks_remaining = self.attacks_remaining.saturating_sub(1);
    }

    pub fn has_attacks_remaining(&self) -> bool {
        self.attacks_remaining > 0
    }

    pub fn has_acted_this_round(&self) -> bool {
        self.acted_this_round
    }

    pub fn set_acted_this_round(&mut self, acted: bool) {
        self.acted_this_round = acted;
    }

    /// Prepares the combatant for a new round.
    ///
    /// Clears the acted flag and the current command, then recomputes the
    /// attack budget. A pending SLOWED is consumed and caps the round at a
    /// single attack, forfeiting any pending ripostes; otherwise pending
    /// ripostes add to the base attack.
    pub fn reset_for_new_round(&mut self) {
        self.acted_this_round = false;
        self.current_command = None;

        self.slowed_this_round = self.status.consume(StatusFlags::SLOWED);
        self.attacks_remaining = if self.slowed_this_round {
            self.pending_ripostes = 0;
            Self::BASE_ATTACKS
        } else {
            Self::BASE_ATTACKS + self.pending_ripostes
        };
    }

    const BASE_ATTACKS: u32 = 1;

    /// True if SLOWED is set or was consumed at the start of this round.
    pub fn is_slowed(&self) -> bool {
        self.slowed_this_round || self.status.contains(StatusFlags::SLOWED)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_alive(&self) -> bool {
        self.actor.is_alive()
    }

    pub fn can_act(&self, now: Timestamp) -> bool {
        self.active && self.is_alive() && !self.is_on_global_cooldown(now)
    }

    // ========================================================================
    // Hit points & armor
    // ========================================================================

    pub fn hp(&self) -> i32 {
        self.actor.hp()
    }

    pub fn hp_max(&self) -> i32 {
        self.actor.hp_max()
    }

    pub fn apply_damage(&mut self, amount: i32) {
        self.actor.apply_damage(amount);
    }

    pub fn heal(&mut self, amount: i32) {
        self.actor.heal(amount);
    }

    pub fn armor(&self) -> i32 {
        self.actor.sheet().armor
    }

    pub fn record_armor_damage(&mut self, category: ArmorCategory, damage: i32) {
        if damage > 0 {
            *self.armor_damage.entry(category).or_insert(0) += damage;
        }
    }

    pub fn armor_damage(&self, category: ArmorCategory) -> i32 {
        self.armor_damage.get(&category).copied().unwrap_or(0)
    }

    pub fn armor_damage_counters(&self) -> &BTreeMap<ArmorCategory, i32> {
        &self.armor_damage
    }

    pub fn reset_armor_damage(&mut self) {
        self.armor_damage.clear();
    }

    /// True if HP has fallen below `threshold` percent of max HP.
    pub fn should_autoflee(&self, threshold: u8) -> bool {
        if threshold == 0 || self.hp_max() <= 0 {
            return false;
        }
        self.hp() * 100 / self.hp_max() < i32::from(threshold)
    }

    // ========================================================================
    // Status effects
    // ========================================================================

    pub fn status(&self) -> StatusFlags {
        self.status
    }

    pub fn add_status(&mut self, flag: StatusFlags) {
        self.status.insert(flag);
    }

    pub fn remove_status(&mut self, flag: StatusFlags) {
        self.status.remove(flag);
    }

    pub fn has_status(&self, flag: StatusFlags) -> bool {
        self.status.contains(flag)
    }

    pub fn clear_status(&mut self) {
        self.status = StatusFlags::empty();
    }

    pub fn consume_interrupted(&mut self) -> bool {
        self.status.consume(StatusFlags::INTERRUPTED)
    }

    pub fn consume_stunned(&mut self) -> bool {
        self.status.consume(StatusFlags::STUNNED)
    }

    pub fn consume_slowed(&mut self) -> bool {
        self.status.consume(StatusFlags::SLOWED)
    }

    pub fn is_prone(&self) -> bool {
        self.status.contains(StatusFlags::PRONE)
    }

    /// See [`StatusFlags::attack_level_modifier`].
    pub fn attack_level_modifier(&self) -> i32 {
        self.status.attack_level_modifier()
    }

    pub fn crit_threshold_bonus(&self) -> i32 {
        self.actor.sheet().crit_threshold_bonus
    }

    // ========================================================================
    // Riposte
    // ========================================================================

    pub fn add_riposte_attack(&mut self) {
        self.pending_ripostes += 1;
    }

    pub fn pending_ripostes(&self) -> u32 {
        self.pending_ripostes
    }

    /// Returns and clears the pending riposte count.
    pub fn take_riposte_attacks(&mut self) -> u32 {
        std::mem::take(&mut self.pending_ripostes)
    }
}

impl fmt::Debug for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combatant")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("alliance", &self.alliance)
            .field("hp", &self.hp())
            .field("active", &self.active)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_player() { "Player" } else { "Mobile" };
        write!(
            f,
            "Combatant[{} {}, HP={}/{}, alliance={}]",
            kind,
            self.name(),
            self.hp(),
            self.hp_max(),
            self.alliance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{npc, player};

    fn create_test_player(hp: i32) -> Combatant {
        let mut actor = player(1, "Ayla", 5, 20);
        actor.sheet_mut().hp = hp;
        Combatant::new(CombatantId(1), actor, Alliance::PLAYERS, Timestamp::ZERO)
    }

    fn create_test_npc() -> Combatant {
        Combatant::new(CombatantId(2), npc(9, "goblin", 3, 12), Alliance(1), Timestamp::ZERO)
    }

    #[test]
    fn reset_clears_acted_and_recomputes_attacks() {
        let mut combatant = create_test_player(20);
        combatant.set_acted_this_round(true);
        combatant.set_attacks_remaining(0);
        combatant.reset_for_new_round();
        assert!(!combatant.has_acted_this_round());
        assert_eq!(combatant.attacks_remaining(), 1);
    }

    #[test]
    fn slowed_limits_round_to_one_attack_and_is_consumed() {
        let mut combatant = create_test_player(20);
        combatant.add_riposte_attack();
        combatant.add_status(StatusFlags::SLOWED);
        combatant.reset_for_new_round();
        assert_eq!(combatant.attacks_remaining(), 1);
        assert!(combatant.is_slowed());
        assert!(!combatant.has_status(StatusFlags::SLOWED));

        combatant.reset_for_new_round();
        assert!(!combatant.is_slowed());
        assert_eq!(combatant.attacks_remaining(), 2);
    }

    #[test]
    fn hostility_follows_alliance() {
        let player = create_test_player(20);
        let mut npc = create_test_npc();
        assert!(player.is_hostile_to(&npc));
        npc.set_alliance(Alliance::PLAYERS);
        assert!(player.is_allied_with(&npc));
    }

    #[test]
    fn armor_damage_ignores_non_positive_amounts() {
        let mut combatant = create_test_player(20);
        combatant.record_armor_damage(ArmorCategory::Leather, 4);
        combatant.record_armor_damage(ArmorCategory::Leather, 0);
        combatant.record_armor_damage(ArmorCategory::Leather, 3);
        combatant.record_armor_damage(ArmorCategory::Plate, -2);
        assert_eq!(combatant.armor_damage(ArmorCategory::Leather), 7);
        assert_eq!(combatant.armor_damage(ArmorCategory::Plate), 0);
        combatant.reset_armor_damage();
        assert!(combatant.armor_damage_counters().is_empty());
    }

    #[test]
    fn cooldowns_compare_against_now() {
        let mut combatant = create_test_npc();
        combatant.set_global_cooldown_until(Timestamp(2_000));
        assert!(combatant.is_on_global_cooldown(Timestamp(1_999)));
        assert!(!combatant.is_on_global_cooldown(Timestamp(2_000)));
        assert_eq!(combatant.global_cooldown_remaining(Timestamp(500)), 1_500);
        assert!(!combatant.can_act(Timestamp(1_000)));
        assert!(combatant.can_act(Timestamp(2_000)));
    }

    #[test]
    fn autoflee_threshold_uses_hp_percentage() {
        let combatant = create_test_player(4);
        assert!(combatant.should_autoflee(25));
        assert!(!combatant.should_autoflee(20));
        assert!(!combatant.should_autoflee(0));
    }

    #[test]
    fn ripostes_are_taken_once() {
        let mut combatant = create_test_player(20);
        combatant.add_riposte_attack();
        combatant.add_riposte_attack();
        assert_eq!(combatant.take_riposte_attacks(), 2);
        assert_eq!(combatant.pending_ripostes(), 0);
    }

    #[test]
    fn slowed_round_forfeits_pending_ripostes() {
        let mut combatant = create_test_player(20);
        combatant.add_riposte_attack();
        combatant.add_status(StatusFlags::SLOWED);
        combatant.reset_for_new_round();
        assert_eq!(combatant.attacks_remaining(), 1);
        assert_eq!(combatant.pending_ripostes(), 0);
    }
}
