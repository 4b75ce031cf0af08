//! Room-facing text for resolved actions.

use crate::result::{CombatResult, ResultKind};

/// `(max damage, singular, plural)`, ascending by threshold.
const DAMAGE_VERBS: &[(i32, &str, &str)] = &[
    (0, "miss", "misses"),
    (1, "scratch", "scratches"),
    (2, "graze", "grazes"),
    (3, "hit", "hits"),
    (5, "injure", "injures"),
    (8, "wound", "wounds"),
    (13, "maul", "mauls"),
    (20, "maim", "maims"),
    (30, "DEVASTATE", "DEVASTATES"),
    (40, "DECIMATE", "DECIMATES"),
    (50, "*MUTILATE*", "*MUTILATES*"),
    (65, "*DESTROY*", "*DESTROYS*"),
    (80, "**EVISCERATE**", "**EVISCERATES**"),
    (100, "**DISEMBOWEL**", "**DISEMBOWELS**"),
    (125, "***MASSACRE***", "***MASSACRES***"),
    (150, "***ANNIHILATE***", "***ANNIHILATES***"),
    (175, "==**DEMOLISH**==", "==**DEMOLISHES**=="),
    (200, "==**ERADICATE**==", "==**ERADICATES**=="),
];

const MAX_VERB: (&str, &str) = ("--==**ATOMIZE**==--", "--==**ATOMIZES**==--");

/// Verb for `damage`; `singular` selects "you hit" over "the attack hits".
pub fn damage_verb(damage: i32, singular: bool) -> &'static str {
    let (one, many) = DAMAGE_VERBS
        .iter()
        .find(|(threshold, _, _)| damage <= *threshold)
        .map(|&(_, one, many)| (one, many))
        .unwrap_or(MAX_VERB);
    if singular { one } else { many }
}

/// Line broadcast to the room for `result`, if the kind has one.
pub fn describe_result(result: &CombatResult) -> Option<String> {
    let attacker = result.attacker().map_or("Someone", |p| p.name.as_str());
    let target = result.target().map_or("something", |p| p.name.as_str());

    let line = match result.kind() {
        ResultKind::Hit | ResultKind::Death => {
            format!("{attacker}'s attack {} {target}!", damage_verb(result.damage(), false))
        }
        ResultKind::CriticalHit => format!(
            "CRITICAL! {attacker}'s attack {} {target}!",
            damage_verb(result.damage(), false)
        ),
        ResultKind::Miss => format!("{attacker}'s attack {} {target}!", damage_verb(0, false)),
        ResultKind::Blocked => format!("{attacker}'s attack is blocked by {target}!"),
        ResultKind::Parried => format!("{attacker}'s attack is parried by {target}!"),
        ResultKind::Dodged => format!("{attacker}'s ranged attack is dodged by {target}!"),
        ResultKind::Heal => format!("{attacker} heals {target} for {} HP!", result.healing()),
        _ => return result.room_message().map(str::to_owned),
    };
    Some(line)
}

pub fn slain_message(victim: &str, killer: &str) -> String {
    format!("{victim} has been slain by {killer}!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::test_support::{npc, player};
    use crate::types::{Alliance, CombatantId, Timestamp};

    #[test]
    fn verbs_follow_thresholds() {
        assert_eq!(damage_verb(0, false), "misses");
        assert_eq!(damage_verb(1, true), "scratch");
        assert_eq!(damage_verb(1, false), "scratches");
        assert_eq!(damage_verb(4, false), "injures");
        assert_eq!(damage_verb(5, false), "injures");
        assert_eq!(damage_verb(6, false), "wounds");
        assert_eq!(damage_verb(51, true), "*DESTROY*");
        assert_eq!(damage_verb(175, false), "==**DEMOLISHES**==");
        assert_eq!(damage_verb(200, false), "==**ERADICATES**==");
        assert_eq!(damage_verb(201, true), "--==**ATOMIZE**==--");
    }

    #[test]
    fn results_render_room_lines() {
        let ayla = Combatant::new(
            CombatantId(1),
            player(1, "Ayla", 5, 20),
            Alliance::PLAYERS,
            Timestamp::ZERO,
        );
        let rat = Combatant::new(
            CombatantId(2),
            npc(1, "a rat", 1, 3),
            Alliance(1),
            Timestamp::ZERO,
        );

        let hit = CombatResult::hit(&ayla, &rat, 3);
        assert_eq!(describe_result(&hit).as_deref(), Some("Ayla's attack hits a rat!"));

        let crit = CombatResult::critical_hit(&ayla, &rat, 10);
        assert_eq!(
            describe_result(&crit).as_deref(),
            Some("CRITICAL! Ayla's attack mauls a rat!")
        );

        let miss = CombatResult::miss(&rat, &ayla);
        assert_eq!(describe_result(&miss).as_deref(), Some("a rat's attack misses Ayla!"));

        let parried = CombatResult::parried(&rat, &ayla);
        assert_eq!(
            describe_result(&parried).as_deref(),
            Some("a rat's attack is parried by Ayla!")
        );

        let death = CombatResult::death(&ayla, &rat, 2);
        assert_eq!(describe_result(&death).as_deref(), Some("Ayla's attack grazes a rat!"));

        let interrupted = CombatResult::interrupted(&rat);
        assert_eq!(
            describe_result(&interrupted).as_deref(),
            Some("a rat's attack is interrupted!")
        );
        assert_eq!(describe_result(&CombatResult::error("Invalid target")), None);
        assert_eq!(slain_message("a rat", "Ayla"), "a rat has been slain by Ayla!");
    }
}
