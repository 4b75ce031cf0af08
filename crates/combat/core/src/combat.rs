//! A single encounter: its combatants, round/turn state machine and log.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::actor::{Actor, Npc, PlayerCharacter};
use crate::combatant::Combatant;
use crate::command::CombatCommand;
use crate::config::CombatConfig;
use crate::env::{Dice, RngOracle};
use crate::error::CombatError;
use crate::events::CombatEvent;
use crate::result::CombatResult;
use crate::types::{Alliance, CombatId, CombatantId, LocationId, Participant, Timestamp};

/// Lifecycle of an encounter.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CombatState {
    Initializing,
    Active,
    /// Reserved; nothing transitions into it yet.
    Paused,
    Ended,
}

impl CombatState {
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
        }
    }
}

/// One timestamped line of the combat log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub round: u32,
    /// Milliseconds since the encounter was created.
    pub elapsed_ms: u64,
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[R{} {:.1}s] {}",
            self.round,
            self.elapsed_ms as f64 / 1000.0,
            self.text
        )
    }
}

/// An encounter bound to one location.
///
/// Rounds and turns are decoupled: every initiative slot may act as soon as
/// the encounter is ticked, but the next round only starts once the round
/// duration has elapsed.
#[derive(Debug)]
pub struct Combat {
    id: CombatId,
    location: LocationId,
    state: CombatState,
    config: CombatConfig,

    round: u32,
    started_at: Timestamp,
    round_started_at: Timestamp,
    ended_at: Option<Timestamp>,
    clock: Timestamp,

    combatants: BTreeMap<CombatantId, Combatant>,
    initiative_order: Vec<CombatantId>,
    turn_index: usize,

    log: VecDeque<LogEntry>,
    round_results: Vec<CombatResult>,
    round_end_handled: bool,

    next_combatant_id: u64,
    next_alliance: u32,
    npc_alliance: Option<Alliance>,

    dice: Dice,
    events: Vec<CombatEvent>,
}

impl Combat {
    pub fn new(
        id: CombatId,
        location: LocationId,
        config: CombatConfig,
        seed: u64,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            location,
            state: CombatState::Initializing,
            config,
            round: 0,
            started_at: now,
            round_started_at: now,
            ended_at: None,
            clock: now,
            combatants: BTreeMap::new(),
            initiative_order: Vec::new(),
            turn_index: 0,
            log: VecDeque::new(),
            round_results: Vec::new(),
            round_end_handled: false,
            next_combatant_id: 1,
            next_alliance: 1,
            npc_alliance: None,
            dice: Dice::new(seed),
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Identity & timing
    // ========================================================================

    pub fn id(&self) -> CombatId {
        self.id
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CombatState::Active
    }

    pub fn has_ended(&self) -> bool {
        self.state == CombatState::Ended
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn round_started_at(&self) -> Timestamp {
        self.round_started_at
    }

    pub fn ended_at(&self) -> Option<Timestamp> {
        self.ended_at
    }

    /// Last time the encounter observed. Actions resolved during a tick
    /// stamp cooldowns relative to it.
    pub fn now(&self) -> Timestamp {
        self.clock
    }

    /// Moves the encounter clock forward; earlier instants are ignored.
    pub fn observe(&mut self, now: Timestamp) {
        self.clock = self.clock.max(now);
    }

    pub fn is_time_for_next_round(&self, now: Timestamp) -> bool {
        now >= self.round_started_at + self.config.round_duration_ms
    }

    pub fn time_until_next_round(&self, now: Timestamp) -> u64 {
        (self.round_started_at + self.config.round_duration_ms).saturating_since(now)
    }

    pub fn duration_ms(&self, now: Timestamp) -> u64 {
        self.ended_at.unwrap_or(now).saturating_since(self.started_at)
    }

    // ========================================================================
    // Combatant management
    // ========================================================================

    /// Adds a player on [`Alliance::PLAYERS`].
    pub fn add_player(&mut self, player: PlayerCharacter) -> CombatantId {
        self.add_combatant(Actor::Player(player), Alliance::PLAYERS)
    }

    /// Adds an NPC on a freshly allocated alliance.
    pub fn add_npc(&mut self, npc: Npc) -> CombatantId {
        let alliance = self.allocate_alliance();
        self.npc_alliance.get_or_insert(alliance);
        self.add_combatant(Actor::Npc(npc), alliance)
    }

    /// Adds an NPC that fights alongside everyone on `alliance`.
    pub fn add_npc_with_alliance(&mut self, npc: Npc, alliance: Alliance) -> CombatantId {
        if alliance != Alliance::PLAYERS {
            self.npc_alliance.get_or_insert(alliance);
        }
        self.add_combatant(Actor::Npc(npc), alliance)
    }

    pub fn allocate_alliance(&mut self) -> Alliance {
        let alliance = Alliance(self.next_alliance);
        self.next_alliance += 1;
        alliance
    }

    /// Alliance of the first NPC that joined, allocating one if none has.
    pub fn npc_alliance(&mut self) -> Alliance {
        match self.npc_alliance {
            Some(alliance) => alliance,
            None => {
                let alliance = self.allocate_alliance();
                self.npc_alliance = Some(alliance);
                alliance
            }
        }
    }

    fn add_combatant(&mut self, actor: Actor, alliance: Alliance) -> CombatantId {
        let id = CombatantId(self.next_combatant_id);
        self.next_combatant_id += 1;
        let text = format!("{} enters combat!", actor.name());
        self.combatants
            .insert(id, Combatant::new(id, actor, alliance, self.clock));
        self.log(text);
        id
    }

    /// Marks the combatant inactive. It stays in the roster so results and
    /// logs can still name it.
    pub fn remove_combatant(&mut self, id: CombatantId) -> Result<(), CombatError> {
        let combatant = self
            .combatants
            .get_mut(&id)
            .ok_or(CombatError::CombatantNotFound(id))?;
        combatant.set_active(false);
        let text = format!("{} is no longer in combat.", combatant.name());
        self.log(text);
        Ok(())
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    pub fn combatants_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.values_mut()
    }

    /// Combatants that are still fighting.
    pub fn active_combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants
            .values()
            .filter(|c| c.is_active() && c.is_alive())
    }

    pub fn combatant_count(&self) -> usize {
        self.combatants.len()
    }

    /// Entry for `participant`, preferring one still in the fight over an
    /// earlier entry that fled.
    pub fn find_participant(&self, participant: Participant) -> Option<&Combatant> {
        let mut entries = self
            .combatants
            .values()
            .filter(|c| c.participant() == participant);
        let first = entries.next()?;
        if first.is_active() {
            return Some(first);
        }
        entries.find(|c| c.is_active()).or(Some(first))
    }

    pub fn contains_participant(&self, participant: Participant) -> bool {
        self.find_participant(participant).is_some()
    }

    /// True if `participant` has an entry that is still fighting.
    pub fn is_fighting(&self, participant: Participant) -> bool {
        self.find_participant(participant)
            .is_some_and(Combatant::is_active)
    }

    /// First combatant whose name starts with `prefix`, ignoring case.
    pub fn find_by_name(&self, prefix: &str) -> Option<&Combatant> {
        let prefix = prefix.to_lowercase();
        self.combatants
            .values()
            .find(|c| c.name().to_lowercase().starts_with(&prefix))
    }

    /// Active, alive combatants hostile to `attacker`, in id order.
    pub fn valid_targets(&self, attacker: CombatantId) -> Vec<CombatantId> {
        let Some(attacker) = self.combatants.get(&attacker) else {
            return Vec::new();
        };
        self.combatants
            .values()
            .filter(|c| c.is_active() && c.is_alive() && c.is_hostile_to(attacker))
            .map(Combatant::id)
            .collect()
    }

    /// Standing combatants `command` may be aimed at by `user`, honouring its
    /// self, ally and enemy targeting flags.
    pub fn command_targets(
        &self,
        user: CombatantId,
        command: &dyn CombatCommand,
    ) -> Vec<CombatantId> {
        let Some(user) = self.combatants.get(&user) else {
            return Vec::new();
        };
        self.combatants
            .values()
            .filter(|c| c.is_active() && c.is_alive())
            .filter(|c| {
                if c.id() == user.id() {
                    command.can_target_self()
                } else if c.is_hostile_to(user) {
                    command.can_target_enemy()
                } else {
                    command.can_target_ally()
                }
            })
            .map(Combatant::id)
            .collect()
    }

    pub fn random_command_target(
        &mut self,
        rng: &dyn RngOracle,
        user: CombatantId,
        command: &dyn CombatCommand,
    ) -> Option<CombatantId> {
        let targets = self.command_targets(user, command);
        let index = self.dice.pick(rng, user, targets.len())?;
        targets.get(index).copied()
    }

    pub fn has_valid_target(&self, attacker: CombatantId) -> bool {
        !self.valid_targets(attacker).is_empty()
    }

    pub fn random_target(
        &mut self,
        rng: &dyn RngOracle,
        attacker: CombatantId,
    ) -> Option<CombatantId> {
        let targets = self.valid_targets(attacker);
        let index = self.dice.pick(rng, attacker, targets.len())?;
        targets.get(index).copied()
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Transitions `Initializing -> Active` and opens round 1.
    pub fn start(&mut self, rng: &dyn RngOracle, now: Timestamp) -> Result<(), CombatError> {
        if self.state != CombatState::Initializing {
            return Err(CombatError::InvalidState {
                expected: CombatState::Initializing,
                actual: self.state,
            });
        }
        self.observe(now);
        self.state = CombatState::Active;
        self.log("=== COMBAT BEGINS ===");
        self.start_new_round(rng, now);
        Ok(())
    }

    /// Rolls initiative for everyone still fighting and resets the turn order.
    ///
    /// Ties keep id order, so the earlier joiner acts first.
    pub fn start_new_round(&mut self, rng: &dyn RngOracle, now: Timestamp) {
        self.observe(now);
        self.round += 1;
        self.round_started_at = now;
        self.round_results.clear();
        self.round_end_handled = false;
        self.turn_index = 0;
        self.log(format!("--- Round {} ---", self.round));

        let dice = &mut self.dice;
        let mut order: Vec<(CombatantId, i32)> = self
            .combatants
            .values_mut()
            .filter(|c| c.is_active() && c.is_alive())
            .map(|c| {
                let initiative = c.roll_initiative(dice, rng);
                c.reset_for_new_round();
                (c.id(), initiative)
            })
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1));
        self.initiative_order = order.into_iter().map(|(id, _)| id).collect();

        self.events.push(CombatEvent::RoundStarted { round: self.round });
    }

    pub fn initiative_order(&self) -> &[CombatantId] {
        &self.initiative_order
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn current_turn(&self) -> Option<CombatantId> {
        self.initiative_order.get(self.turn_index).copied()
    }

    /// Moves past the current slot and any inactive or dead ones after it.
    /// Returns false once the round is complete.
    pub fn advance_turn(&mut self) -> bool {
        self.turn_index += 1;
        while let Some(id) = self.initiative_order.get(self.turn_index) {
            if self
                .combatants
                .get(id)
                .is_some_and(|c| c.is_active() && c.is_alive())
            {
                return true;
            }
            self.turn_index += 1;
        }
        false
    }

    pub fn is_round_complete(&self) -> bool {
        self.turn_index >= self.initiative_order.len()
    }

    /// True when at most one alliance still has a fighter standing.
    pub fn should_end(&self) -> bool {
        let alliances: BTreeSet<Alliance> =
            self.active_combatants().map(Combatant::alliance).collect();
        alliances.len() <= 1
    }

    /// Transitions to `Ended`, logs the survivors and stands everyone down.
    pub fn end(&mut self, now: Timestamp) {
        self.observe(now);
        self.state = CombatState::Ended;
        self.ended_at = Some(now);

        let survivors: Vec<&str> = self.active_combatants().map(Combatant::name).collect();
        let text = if survivors.is_empty() {
            "=== COMBAT ENDS - No survivors ===".to_owned()
        } else {
            format!("=== COMBAT ENDS - Survivors: {} ===", survivors.join(", "))
        };
        self.log(text);

        for combatant in self.combatants.values_mut() {
            combatant.clear_command_queue();
            combatant.set_active(false);
        }
    }

    /// Returns true the first time it is called after the round's turns are
    /// exhausted, so round-end upkeep runs once per round.
    pub fn take_round_end(&mut self) -> bool {
        if self.is_round_complete() && !self.round_end_handled {
            self.round_end_handled = true;
            return true;
        }
        false
    }

    // ========================================================================
    // Results, log & events
    // ========================================================================

    pub fn add_round_result(&mut self, result: CombatResult) {
        self.round_results.push(result);
    }

    pub fn round_results(&self) -> &[CombatResult] {
        &self.round_results
    }

    /// Appends a line stamped with the round and time since creation. The
    /// oldest lines are dropped past the configured capacity.
    pub fn log(&mut self, text: impl Into<String>) {
        if self.config.log_capacity == 0 {
            return;
        }
        while self.log.len() >= self.config.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            round: self.round,
            elapsed_ms: self.clock.saturating_since(self.started_at),
            text: text.into(),
        });
    }

    pub fn combat_log(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    /// Last `lines` log lines, newline separated.
    pub fn recent_log(&self, lines: usize) -> String {
        let skip = self.log.len().saturating_sub(lines);
        self.log
            .iter()
            .skip(skip)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    pub fn dice_mut(&mut self) -> &mut Dice {
        &mut self.dice
    }

    /// Lends one combatant together with the dice stream, for rolls that read
    /// the roller's own state.
    pub fn with_combatant_dice<R>(
        &mut self,
        id: CombatantId,
        f: impl FnOnce(&Combatant, &mut Dice) -> R,
    ) -> Option<R> {
        let combatant = self.combatants.get(&id)?;
        Some(f(combatant, &mut self.dice))
    }

    pub fn push_event(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> String {
        let (players, mobs): (Vec<&Combatant>, Vec<&Combatant>) =
            self.active_combatants().partition(|c| c.is_player());
        format!(
            "Combat #{} [{}] Round {} - {} players, {} mobs - Room {}",
            self.id,
            self.state.display_name(),
            self.round,
            players.len(),
            mobs.len(),
            self.location
        )
    }
}

impl fmt::Display for Combat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorSheet;
    use crate::env::SequenceRng;
    use crate::types::{CharacterId, NpcId};

    fn hero(id: u32, name: &str) -> PlayerCharacter {
        PlayerCharacter::new(CharacterId(id), ActorSheet::new(name, 5, 20))
    }

    fn goblin(id: u64) -> Npc {
        Npc::new(NpcId(id), ActorSheet::new("goblin", 3, 10))
    }

    fn create_test_combat() -> Combat {
        Combat::new(
            CombatId(1),
            LocationId(3001),
            CombatConfig::default(),
            42,
            Timestamp(1_000),
        )
    }

    #[test]
    fn ids_and_alliances_are_allocated_in_order() {
        let mut combat = create_test_combat();
        let a = combat.add_player(hero(1, "Ayla"));
        let b = combat.add_npc(goblin(1));
        let c = combat.add_npc(goblin(2));
        assert_eq!((a, b, c), (CombatantId(1), CombatantId(2), CombatantId(3)));
        assert_eq!(combat.combatant(a).unwrap().alliance(), Alliance::PLAYERS);
        assert_eq!(combat.combatant(b).unwrap().alliance(), Alliance(1));
        assert_eq!(combat.combatant(c).unwrap().alliance(), Alliance(2));
        assert_eq!(combat.npc_alliance(), Alliance(1));
    }

    #[test]
    fn start_only_from_initializing() {
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(1));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert_eq!(combat.state(), CombatState::Active);
        assert_eq!(combat.round(), 1);
        assert_eq!(
            combat.start(&rng, Timestamp(1_000)),
            Err(CombatError::InvalidState {
                expected: CombatState::Initializing,
                actual: CombatState::Active,
            })
        );
    }

    #[test]
    fn initiative_ties_go_to_lower_id() {
        // Every d20 rolls 11 and everyone has DEX 10.
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        combat.add_npc(goblin(1));
        combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(2));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert_eq!(
            combat.initiative_order(),
            &[CombatantId(1), CombatantId(2), CombatantId(3)]
        );
    }

    #[test]
    fn initiative_sorts_descending() {
        let rng = SequenceRng::new(vec![2, 18, 9]);
        let mut combat = create_test_combat();
        combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(1));
        combat.add_npc(goblin(2));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert_eq!(
            combat.initiative_order(),
            &[CombatantId(2), CombatantId(3), CombatantId(1)]
        );
    }

    #[test]
    fn advance_turn_skips_fallen_combatants() {
        let rng = SequenceRng::new(vec![19, 10, 1]);
        let mut combat = create_test_combat();
        let a = combat.add_player(hero(1, "Ayla"));
        let b = combat.add_npc(goblin(1));
        let c = combat.add_npc(goblin(2));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert_eq!(combat.initiative_order(), &[a, b, c]);

        combat.combatant_mut(b).unwrap().apply_damage(100);
        assert!(combat.advance_turn());
        assert_eq!(combat.current_turn(), Some(c));
        assert!(!combat.advance_turn());
        assert!(combat.is_round_complete());
    }

    #[test]
    fn should_end_tracks_alliances_left_standing() {
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        combat.add_player(hero(1, "Ayla"));
        let goblin_id = combat.add_npc(goblin(1));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert!(!combat.should_end());

        combat.combatant_mut(goblin_id).unwrap().apply_damage(10);
        assert!(combat.should_end());
    }

    #[test]
    fn round_pacing_uses_round_duration() {
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(1));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert!(!combat.is_time_for_next_round(Timestamp(3_999)));
        assert!(combat.is_time_for_next_round(Timestamp(4_000)));
        assert_eq!(combat.time_until_next_round(Timestamp(2_500)), 1_500);
        assert_eq!(combat.time_until_next_round(Timestamp(9_000)), 0);
    }

    #[test]
    fn end_logs_survivors_and_stands_down() {
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        let a = combat.add_player(hero(1, "Ayla"));
        let b = combat.add_npc(goblin(1));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        combat.combatant_mut(b).unwrap().apply_damage(10);
        combat.end(Timestamp(2_500));

        assert!(combat.has_ended());
        assert_eq!(combat.duration_ms(Timestamp(10_000)), 1_500);
        assert!(!combat.combatant(a).unwrap().is_active());
        assert_eq!(
            combat.recent_log(1),
            "[R1 1.5s] === COMBAT ENDS - Survivors: Ayla ==="
        );
    }

    #[test]
    fn end_without_survivors() {
        let mut combat = create_test_combat();
        let a = combat.add_player(hero(1, "Ayla"));
        combat.combatant_mut(a).unwrap().apply_damage(50);
        combat.end(Timestamp(1_000));
        assert!(combat.recent_log(1).ends_with("=== COMBAT ENDS - No survivors ==="));
    }

    #[test]
    fn log_is_bounded_and_formatted() {
        let config = CombatConfig {
            log_capacity: 2,
            ..CombatConfig::default()
        };
        let mut combat = Combat::new(CombatId(1), LocationId(1), config, 0, Timestamp(0));
        combat.log("one");
        combat.log("two");
        combat.log("three");
        assert_eq!(combat.combat_log().count(), 2);
        assert_eq!(combat.recent_log(5), "[R0 0.0s] two\n[R0 0.0s] three");
    }

    #[test]
    fn removal_and_lookup() {
        let mut combat = create_test_combat();
        let a = combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(1));

        assert_eq!(combat.find_by_name("GOB").map(Combatant::id), Some(CombatantId(2)));
        assert!(combat.find_by_name("orc").is_none());
        assert!(combat.contains_participant(Participant::Player(CharacterId(1))));

        combat.remove_combatant(a).unwrap();
        assert!(!combat.combatant(a).unwrap().is_active());
        assert!(combat.recent_log(1).ends_with("Ayla is no longer in combat."));
        assert_eq!(
            combat.remove_combatant(CombatantId(9)),
            Err(CombatError::CombatantNotFound(CombatantId(9)))
        );

        let ayla = Participant::Player(CharacterId(1));
        assert!(!combat.is_fighting(ayla));
        let rejoined = combat.add_player(hero(1, "Ayla"));
        assert!(combat.is_fighting(ayla));
        assert_eq!(combat.find_participant(ayla).map(Combatant::id), Some(rejoined));
    }

    #[test]
    fn summary_counts_active_sides() {
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(1));
        combat.add_npc(goblin(2));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert_eq!(
            combat.summary(),
            "Combat #1 [Active] Round 1 - 1 players, 2 mobs - Room 3001"
        );
    }

    #[test]
    fn round_end_is_taken_once() {
        let rng = SequenceRng::new(vec![10]);
        let mut combat = create_test_combat();
        combat.add_player(hero(1, "Ayla"));
        combat.add_npc(goblin(1));
        combat.start(&rng, Timestamp(1_000)).unwrap();
        assert!(!combat.take_round_end());
        while combat.advance_turn() {}
        assert!(combat.take_round_end());
        assert!(!combat.take_round_end());
        combat.start_new_round(&rng, Timestamp(4_000));
        assert!(!combat.take_round_end());
    }
}
