//! Process-wide encounter registry and tick driver.
//!
//! [`CombatManager`] creates encounters when fights break out, advances every
//! registered encounter on each tick, turns engine events into narration and
//! persistent side effects, and deregisters encounters once they end.
//!
//! Lock order is registry before encounter: a registry lock may be held while
//! an encounter is locked, never the other way around.
mod upkeep;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use combat_core::narration::{describe_result, slain_message};
use combat_core::{
    Actor, CharacterId, Combat, CombatCommand, CombatConfig, CombatEvent, CombatId, CombatResult,
    Combatant, LocationId, Npc, Participant, PlayerCharacter, TargetingPolicy, Timestamp,
    compute_seed, process_combat_tick,
};

use crate::api::{FleeHandler, NarrationSink, NoEscape, Result, RuntimeError};
use crate::clock::{Clock, SystemClock};
use crate::events::{EncounterEvent, EventBus, TurnEvent};
use crate::oracle::OracleManager;

pub use upkeep::{armor_training_chance, experience_for_kill};
use upkeep::Upkeep;

/// One encounter, shared between the tick task and input handlers.
pub type SharedCombat = Arc<Mutex<Combat>>;

pub const COMBAT_ENDED: &str = "=== Combat has ended ===";

enum Advance {
    Idle,
    Continued(Vec<Participant>),
    Ended(Vec<Participant>),
}

pub struct CombatManager {
    config: CombatConfig,
    oracles: OracleManager,
    sink: Arc<dyn NarrationSink>,
    flee: Arc<dyn FleeHandler>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    targeting: TargetingPolicy,
    seed: Option<u64>,
    next_id: AtomicU64,

    by_id: RwLock<HashMap<CombatId, SharedCombat>>,
    by_location: RwLock<HashMap<LocationId, SharedCombat>>,
    by_participant: RwLock<HashMap<Participant, SharedCombat>>,
}

impl CombatManager {
    pub fn new(config: CombatConfig, oracles: OracleManager, sink: Arc<dyn NarrationSink>) -> Self {
        Self {
            config,
            oracles,
            sink,
            flee: Arc::new(NoEscape),
            clock: Arc::new(SystemClock::new()),
            events: EventBus::new(),
            targeting: TargetingPolicy::default(),
            seed: None,
            next_id: AtomicU64::new(1),
            by_id: RwLock::new(HashMap::new()),
            by_location: RwLock::new(HashMap::new()),
            by_participant: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_flee_handler(mut self, flee: Arc<dyn FleeHandler>) -> Self {
        self.flee = flee;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_targeting(mut self, targeting: TargetingPolicy) -> Self {
        self.targeting = targeting;
        self
    }

    /// Derives every encounter seed from `seed` instead of drawing fresh
    /// entropy, making whole sessions reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn upkeep(&self) -> Upkeep<'_> {
        Upkeep {
            oracles: &self.oracles,
            sink: self.sink.as_ref(),
        }
    }

    fn seed_for(&self, id: CombatId) -> u64 {
        match self.seed {
            Some(seed) => compute_seed(seed, id.0, 0, 0),
            None => rand::random(),
        }
    }

    // ========================================================================
    // Initiation
    // ========================================================================

    /// A player attacks an NPC at `location`.
    ///
    /// Joins the active encounter there if one exists, adding whichever side
    /// is not already fighting; otherwise starts a new one.
    pub fn initiate_combat(
        &self,
        player: PlayerCharacter,
        npc: Npc,
        location: LocationId,
    ) -> SharedCombat {
        let opening = format!("{} attacks {}!", player.sheet.name, npc.sheet.name);
        self.engage(location, [Actor::Player(player), Actor::Npc(npc)], opening)
    }

    /// An NPC attacks a player at `location`. Same join rules as
    /// [`Self::initiate_combat`].
    pub fn mobile_initiate_combat(
        &self,
        npc: Npc,
        player: PlayerCharacter,
        location: LocationId,
    ) -> SharedCombat {
        let opening = format!("{} attacks {}!", npc.sheet.name, player.sheet.name);
        self.engage(location, [Actor::Npc(npc), Actor::Player(player)], opening)
    }

    fn engage(&self, location: LocationId, actors: [Actor; 2], opening: String) -> SharedCombat {
        let now = self.clock.now();

        // The location index is never held while an encounter is locked, so a
        // slow tick cannot stall initiations elsewhere. A replaced entry
        // between the lookup and the insert sends us round again.
        let (shared, id, participants) = loop {
            let seen = self.by_location.read().get(&location).cloned();
            if let Some(shared) = seen.as_ref() {
                let mut combat = shared.lock();
                if combat.is_active() {
                    combat.observe(now);
                    let joined: Vec<Participant> = actors
                        .into_iter()
                        .filter_map(|actor| join(&mut combat, actor))
                        .collect();
                    let id = combat.id();
                    drop(combat);
                    self.register_joined(shared, id, joined);
                    return Arc::clone(shared);
                }
            }

            let mut by_location = self.by_location.write();
            let unchanged = match (by_location.get(&location), seen.as_ref()) {
                (None, None) => true,
                (Some(current), Some(seen)) => Arc::ptr_eq(current, seen),
                _ => false,
            };
            if !unchanged {
                continue;
            }

            let id = CombatId(self.next_id.fetch_add(1, Ordering::Relaxed));
            let mut combat = Combat::new(id, location, self.config, self.seed_for(id), now);
            let participants: Vec<Participant> = actors.iter().map(Actor::participant).collect();
            for actor in actors {
                match actor {
                    Actor::Player(player) => combat.add_player(player),
                    Actor::Npc(npc) => combat.add_npc(npc),
                };
            }
            if let Err(error) = combat.start(self.oracles.rng(), now) {
                tracing::warn!(combat = %id, %error, "encounter failed to start");
            }

            let shared: SharedCombat = Arc::new(Mutex::new(combat));
            by_location.insert(location, Arc::clone(&shared));
            self.by_id.write().insert(id, Arc::clone(&shared));
            {
                let mut by_participant = self.by_participant.write();
                for participant in &participants {
                    by_participant.insert(*participant, Arc::clone(&shared));
                }
            }
            break (shared, id, participants);
        };

        tracing::info!(combat = %id, location = location.0, "encounter started");
        self.sink.broadcast_to_location(location, &opening);
        {
            let mut combat = shared.lock();
            self.dispatch_events(&mut combat);
        }
        self.events.publish(EncounterEvent::Started {
            combat: id,
            location,
            participants,
        });
        shared
    }

    fn register_joined(&self, shared: &SharedCombat, id: CombatId, joined: Vec<Participant>) {
        {
            let mut by_participant = self.by_participant.write();
            for participant in &joined {
                by_participant.insert(*participant, Arc::clone(shared));
            }
        }
        for participant in joined {
            tracing::debug!(combat = %id, %participant, "joined running encounter");
            self.events.publish(EncounterEvent::Joined {
                combat: id,
                participant,
            });
        }
    }

    /// An aggressive NPC wades into the fight at `location` on the side of
    /// the other NPCs. Returns false if there is no active encounter there or
    /// the NPC is already fighting in it.
    pub fn aggro_join(&self, npc: Npc, location: LocationId) -> bool {
        let Some(shared) = self.combat_at(location) else {
            return false;
        };
        let participant = Participant::Npc(npc.id);
        let name = npc.sheet.name.clone();

        let id = {
            let mut combat = shared.lock();
            if !combat.is_active() || combat.is_fighting(participant) {
                return false;
            }
            combat.observe(self.clock.now());
            let alliance = combat.npc_alliance();
            combat.add_npc_with_alliance(npc, alliance);
            combat.id()
        };
        self.by_participant
            .write()
            .insert(participant, Arc::clone(&shared));

        self.sink
            .broadcast_to_location(location, &format!("{name} joins the fight!"));
        self.events.publish(EncounterEvent::Joined {
            combat: id,
            participant,
        });
        true
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances every registered encounter to the current clock time.
    pub fn tick(&self) -> usize {
        self.tick_at(self.clock.now())
    }

    /// Advances every registered encounter to `now`, ends the ones that are
    /// decided and deregisters them. Returns the number of encounters that
    /// were processed.
    ///
    /// A panic inside one encounter is logged and does not affect the others.
    pub fn tick_at(&self, now: Timestamp) -> usize {
        let mut encounters: Vec<(CombatId, SharedCombat)> = self
            .by_id
            .read()
            .iter()
            .map(|(id, shared)| (*id, Arc::clone(shared)))
            .collect();
        encounters.sort_by_key(|(id, _)| *id);

        let mut finished = Vec::new();
        let mut processed = 0;
        for (id, shared) in encounters {
            match panic::catch_unwind(AssertUnwindSafe(|| self.advance(&shared, now))) {
                Ok(Advance::Idle) => {}
                Ok(Advance::Continued(fled)) => {
                    processed += 1;
                    self.release_participants(&shared, id, &fled);
                }
                Ok(Advance::Ended(fled)) => {
                    processed += 1;
                    self.release_participants(&shared, id, &fled);
                    finished.push(shared);
                }
                Err(_) => {
                    tracing::error!(combat = %id, "combat tick panicked; encounter skipped");
                }
            }
        }

        for shared in finished {
            self.cleanup(&shared);
        }
        processed
    }

    fn advance(&self, shared: &SharedCombat, now: Timestamp) -> Advance {
        let mut combat = shared.lock();
        if combat.has_ended() {
            return Advance::Ended(Vec::new());
        }
        if !combat.is_active() {
            return Advance::Idle;
        }

        let env = self.oracles.as_env();
        let turns = process_combat_tick(&mut combat, &env, &self.targeting, now);
        if turns > 0 {
            tracing::debug!(
                combat = %combat.id(),
                round = combat.round(),
                turns,
                "resolved turns"
            );
        }
        self.dispatch_events(&mut combat);

        let mut fled = Vec::new();
        if !combat.should_end() && combat.take_round_end() {
            fled = self.upkeep().autoflee(&mut combat, self.flee.as_ref());
            for participant in &fled {
                self.events.publish(TurnEvent::Fled {
                    combat: combat.id(),
                    participant: *participant,
                });
            }
            if !combat.should_end() {
                self.send_prompts(&combat);
            }
        }

        if combat.should_end() {
            self.finish(&mut combat, now);
            return Advance::Ended(fled);
        }
        Advance::Continued(fled)
    }

    /// Narrates and applies everything the engine queued since the last
    /// drain.
    fn dispatch_events(&self, combat: &mut Combat) {
        let id = combat.id();
        let location = combat.location();
        let upkeep = self.upkeep();

        for event in combat.drain_events() {
            match event {
                CombatEvent::RoundStarted { round } => {
                    tracing::debug!(combat = %id, round, "round started");
                    if round > 1 {
                        self.sink.broadcast_to_location(location, "");
                    }
                }
                CombatEvent::Resolved(result) => {
                    if let Some(line) = describe_result(&result) {
                        self.sink.broadcast_to_location(location, &line);
                    }
                    self.notify_parties(combat, &result);
                    if result.dealt_damage()
                        && let Some(target) = result.target()
                    {
                        upkeep.on_damage(combat, target.id, result.damage());
                    }
                    self.events.publish(TurnEvent::Resolved { combat: id, result });
                }
                CombatEvent::Slain { victim, killer } => {
                    let (Some(victim_entry), Some(killer_entry)) =
                        (combat.combatant(victim), combat.combatant(killer))
                    else {
                        continue;
                    };
                    let line = slain_message(victim_entry.name(), killer_entry.name());
                    let (victim_party, killer_party) =
                        (victim_entry.participant(), killer_entry.participant());
                    self.sink.broadcast_to_location(location, &line);
                    upkeep.on_kill(combat, killer, victim);
                    tracing::debug!(
                        combat = %id,
                        victim = %victim_party,
                        killer = %killer_party,
                        "combatant slain"
                    );
                    self.events.publish(TurnEvent::Slain {
                        combat: id,
                        victim: victim_party,
                        killer: killer_party,
                    });
                }
                CombatEvent::SkillImproved { growth, .. } => {
                    self.sink.send_to_participant(
                        Participant::Player(growth.character),
                        &growth.message(),
                    );
                    self.events
                        .publish(TurnEvent::SkillImproved { combat: id, growth });
                }
            }
        }
    }

    /// Private lines carried on a result go to the players involved.
    fn notify_parties(&self, combat: &Combat, result: &CombatResult) {
        let player_of = |party: Option<&combat_core::ResultParty>| {
            party
                .and_then(|party| combat.combatant(party.id))
                .filter(|c| c.is_player())
                .map(Combatant::participant)
        };
        if let (Some(to), Some(message)) = (player_of(result.attacker()), result.attacker_message())
        {
            self.sink.send_to_participant(to, message);
        }
        if let (Some(to), Some(message)) = (player_of(result.target()), result.target_message()) {
            self.sink.send_to_participant(to, message);
        }
    }

    fn send_prompts(&self, combat: &Combat) {
        for character in combat.active_combatants().filter_map(Combatant::character_id) {
            self.sink.send_prompt(character);
        }
    }

    // ========================================================================
    // Ending & cleanup
    // ========================================================================

    /// Ends an encounter now, whatever its state, and deregisters it.
    pub fn end_combat(&self, id: CombatId) -> Result<()> {
        let shared = self.combat_by_id(id).ok_or(RuntimeError::CombatNotFound(id))?;
        {
            let mut combat = shared.lock();
            self.finish(&mut combat, self.clock.now());
        }
        self.cleanup(&shared);
        Ok(())
    }

    /// Ends and deregisters every encounter. Returns how many there were.
    pub fn shutdown(&self) -> usize {
        let mut encounters: Vec<(CombatId, SharedCombat)> = self
            .by_id
            .read()
            .iter()
            .map(|(id, shared)| (*id, Arc::clone(shared)))
            .collect();
        encounters.sort_by_key(|(id, _)| *id);

        let now = self.clock.now();
        for (_, shared) in &encounters {
            {
                let mut combat = shared.lock();
                self.finish(&mut combat, now);
            }
            self.cleanup(shared);
        }
        tracing::info!(count = encounters.len(), "combat manager shut down");
        encounters.len()
    }

    /// Armor training, HP write-back, `end`, then the closing broadcast and
    /// prompts for surviving players. No-op on an encounter already ended.
    fn finish(&self, combat: &mut Combat, now: Timestamp) {
        if combat.has_ended() {
            return;
        }
        let upkeep = self.upkeep();
        upkeep.train_armor(combat);
        upkeep.sync_player_hp(combat);

        let survivors: Vec<Participant> = combat
            .active_combatants()
            .map(Combatant::participant)
            .collect();
        combat.end(now);

        self.sink.broadcast_to_location(combat.location(), COMBAT_ENDED);
        for character in survivors.iter().filter_map(|p| p.character_id()) {
            self.sink.send_prompt(character);
        }

        tracing::info!(
            combat = %combat.id(),
            rounds = combat.round(),
            duration_ms = combat.duration_ms(now),
            "encounter ended"
        );
        self.events.publish(EncounterEvent::Ended {
            combat: combat.id(),
            location: combat.location(),
            rounds: combat.round(),
            survivors,
        });
    }

    /// Drops `participants` from the participant index if it still points at
    /// `shared`.
    fn release_participants(
        &self,
        shared: &SharedCombat,
        id: CombatId,
        participants: &[Participant],
    ) {
        if participants.is_empty() {
            return;
        }
        let mut by_participant = self.by_participant.write();
        for participant in participants {
            if by_participant
                .get(participant)
                .is_some_and(|current| Arc::ptr_eq(current, shared))
            {
                by_participant.remove(participant);
                tracing::debug!(combat = %id, %participant, "left encounter");
            }
        }
    }

    /// Removes the encounter from every index. Entries that already point at
    /// a newer encounter are left alone.
    fn cleanup(&self, shared: &SharedCombat) {
        let (id, location, participants) = {
            let combat = shared.lock();
            let participants: Vec<Participant> =
                combat.combatants().map(Combatant::participant).collect();
            (combat.id(), combat.location(), participants)
        };

        {
            let mut by_location = self.by_location.write();
            if by_location
                .get(&location)
                .is_some_and(|current| Arc::ptr_eq(current, shared))
            {
                by_location.remove(&location);
            }
        }
        self.by_id.write().remove(&id);
        self.release_participants(shared, id, &participants);
    }

    // ========================================================================
    // Commands & queries
    // ========================================================================

    /// Replaces whatever the player had queued with `command`. Returns false
    /// if the player is not fighting.
    pub fn queue_player_command(
        &self,
        character: CharacterId,
        command: Arc<dyn CombatCommand>,
    ) -> bool {
        let participant = Participant::Player(character);
        let Some(shared) = self.combat_for(participant) else {
            return false;
        };
        let mut combat = shared.lock();
        let Some(id) = combat
            .find_participant(participant)
            .filter(|c| c.is_active())
            .map(Combatant::id)
        else {
            return false;
        };
        let Some(combatant) = combat.combatant_mut(id) else {
            return false;
        };
        combatant.clear_command_queue();
        combatant.queue_command(command);
        true
    }

    pub fn is_in_combat(&self, participant: Participant) -> bool {
        self.combat_for(participant).is_some()
    }

    /// Active encounter `participant` is fighting in.
    pub fn combat_for(&self, participant: Participant) -> Option<SharedCombat> {
        let shared = self.by_participant.read().get(&participant).cloned()?;
        let active = shared.lock().is_active();
        active.then_some(shared)
    }

    /// Snapshot of the participant's combatant.
    pub fn combatant_for(&self, participant: Participant) -> Option<Combatant> {
        let shared = self.combat_for(participant)?;
        let combat = shared.lock();
        combat.find_participant(participant).cloned()
    }

    /// Active encounter at `location`.
    pub fn combat_at(&self, location: LocationId) -> Option<SharedCombat> {
        let shared = self.by_location.read().get(&location).cloned()?;
        let active = shared.lock().is_active();
        active.then_some(shared)
    }

    /// Registered encounter by id, in any state.
    pub fn combat_by_id(&self, id: CombatId) -> Option<SharedCombat> {
        self.by_id.read().get(&id).cloned()
    }

    /// Encounter the participant is fighting in, or an error naming them.
    pub fn require_combat(&self, participant: Participant) -> Result<SharedCombat> {
        self.combat_for(participant)
            .ok_or(RuntimeError::NotInCombat(participant))
    }

    pub fn active_combat_count(&self) -> usize {
        self.by_id
            .read()
            .values()
            .filter(|shared| shared.lock().is_active())
            .count()
    }

    /// Registered encounters, including ended ones awaiting cleanup.
    pub fn registered_count(&self) -> usize {
        self.by_id.read().len()
    }
}

impl std::fmt::Debug for CombatManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatManager")
            .field("config", &self.config)
            .field("registered", &self.registered_count())
            .finish_non_exhaustive()
    }
}

/// Adds `actor` unless it is already fighting. NPCs side with the
/// encounter's existing NPCs.
fn join(combat: &mut Combat, actor: Actor) -> Option<Participant> {
    let participant = actor.participant();
    if combat.is_fighting(participant) {
        return None;
    }
    match actor {
        Actor::Player(player) => combat.add_player(player),
        Actor::Npc(npc) => {
            let alliance = combat.npc_alliance();
            combat.add_npc_with_alliance(npc, alliance)
        }
    };
    Some(participant)
}
