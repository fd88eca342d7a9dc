//! Chore scoring and standings.

use crate::domain::model::{Member, Roster};
use crate::utils::error::{EntityKind, HouseholdError, Result};
use crate::utils::validation::name_key;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chore {
    pub name: String,
    pub points: u32,
    pub completions: BTreeMap<Member, u32>,
}

impl Chore {
    pub fn new(name: impl Into<String>, points: u32) -> Self {
        Self {
            name: name.into(),
            points,
            completions: BTreeMap::new(),
        }
    }

    pub fn completions_by(&self, member: &Member) -> u32 {
        self.completions.get(member).copied().unwrap_or(0)
    }

    pub fn score_for(&self, member: &Member) -> u64 {
        u64::from(self.points) * u64::from(self.completions_by(member))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoreCompletionEvent {
    pub member: Member,
    pub timestamp: NaiveDateTime,
    pub chores: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    Participant,
}

impl Medal {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Medal::Gold,
            2 => Medal::Silver,
            3 => Medal::Bronze,
            _ => Medal::Participant,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
            Medal::Participant => "🏅",
        }
    }
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.icon())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub member: Member,
    pub score: u64,
    pub rank: usize,
    pub medal: Medal,
}

/// Chore definitions plus completion history, most recent event first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoreLedger {
    chores: Vec<Chore>,
    history: Vec<ChoreCompletionEvent>,
}

impl ChoreLedger {
    pub fn new(chores: Vec<Chore>, history: Vec<ChoreCompletionEvent>) -> Self {
        Self { chores, history }
    }

    pub fn chores(&self) -> &[Chore] {
        &self.chores
    }

    pub fn history(&self) -> &[ChoreCompletionEvent] {
        &self.history
    }

    pub fn recent_history(&self, limit: usize) -> &[ChoreCompletionEvent] {
        &self.history[..self.history.len().min(limit)]
    }

    pub fn into_parts(self) -> (Vec<Chore>, Vec<ChoreCompletionEvent>) {
        (self.chores, self.history)
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.chores
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                let key = name_key(name);
                self.chores.iter().position(|c| name_key(&c.name) == key)
            })
    }

    pub fn score(&self, member: &Member) -> u64 {
        self.chores.iter().map(|c| c.score_for(member)).sum()
    }

    /// Scores for the whole roster, best first. Equal scores keep roster order
    /// and share rank and medal; the next distinct score takes its position
    /// (1, 1, 3).
    pub fn standings(&self, roster: &Roster) -> Vec<Standing> {
        let mut scored: Vec<(Member, u64)> = roster
            .members()
            .iter()
            .map(|m| (m.clone(), self.score(m)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let mut standings: Vec<Standing> = Vec::with_capacity(scored.len());
        for (position, (member, score)) in scored.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev) if prev.score == score => prev.rank,
                _ => position + 1,
            };
            standings.push(Standing {
                member,
                score,
                rank,
                medal: Medal::for_rank(rank),
            });
        }
        standings
    }

    /// Credits `member` with one completion of each named chore and prepends
    /// the event to the history. All names are checked before any count
    /// changes; an empty selection still records an event.
    pub fn record_completion<S: AsRef<str>>(
        &mut self,
        roster: &Roster,
        member: &str,
        chore_names: &[S],
        timestamp: NaiveDateTime,
    ) -> Result<&ChoreCompletionEvent> {
        let member = roster.resolve(member)?;

        let mut indices: Vec<usize> = Vec::with_capacity(chore_names.len());
        for name in chore_names {
            let idx = self
                .position_of(name.as_ref())
                .ok_or_else(|| HouseholdError::unknown_chore(name.as_ref().trim()))?;
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }

        for &idx in &indices {
            *self.chores[idx]
                .completions
                .entry(member.clone())
                .or_insert(0) += 1;
        }

        let event = ChoreCompletionEvent {
            member,
            timestamp,
            chores: indices
                .iter()
                .map(|&idx| self.chores[idx].name.clone())
                .collect(),
        };
        tracing::debug!(
            member = %event.member,
            chores = event.chores.len(),
            "Recorded chore completion"
        );
        self.history.insert(0, event);
        Ok(&self.history[0])
    }

    /// Removes the history entry at `position` (0 = most recent) and takes
    /// back the completions it granted. Counts stop at zero; chores that no
    /// longer exist are skipped.
    pub fn revoke_completion(&mut self, position: usize) -> Result<ChoreCompletionEvent> {
        if position >= self.history.len() {
            return Err(HouseholdError::UnknownEntity {
                kind: EntityKind::HistoryEntry,
                name: position.to_string(),
            });
        }
        let event = self.history.remove(position);

        for name in &event.chores {
            match self.position_of(name) {
                Some(idx) => {
                    if let Some(count) = self.chores[idx].completions.get_mut(&event.member) {
                        *count = count.saturating_sub(1);
                    }
                }
                None => tracing::warn!(chore = %name, "Revoked entry names a chore that no longer exists"),
            }
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roster() -> Roster {
        Roster::new(["Andrea", "Marco", "Martino"]).unwrap()
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn ledger() -> ChoreLedger {
        ChoreLedger::new(
            vec![Chore::new("Dishes", 2), Chore::new("Laundry", 3)],
            Vec::new(),
        )
    }

    fn ranks(standings: &[Standing]) -> Vec<(&str, u64, usize)> {
        standings
            .iter()
            .map(|s| (s.member.name(), s.score, s.rank))
            .collect()
    }

    #[test]
    fn test_standings_scenario() {
        let roster = roster();
        let mut ledger = ChoreLedger::new(vec![Chore::new("Dishes", 2)], Vec::new());
        ledger.record_completion(&roster, "Andrea", &["Dishes"], at(8)).unwrap();
        ledger.record_completion(&roster, "Andrea", &["Dishes"], at(9)).unwrap();
        ledger.record_completion(&roster, "Marco", &["Dishes"], at(10)).unwrap();

        let standings = ledger.standings(&roster);
        assert_eq!(
            ranks(&standings),
            vec![("Andrea", 4, 1), ("Marco", 2, 2), ("Martino", 0, 3)]
        );
        assert_eq!(standings[0].medal, Medal::Gold);
        assert_eq!(standings[2].medal, Medal::Bronze);
    }

    #[test]
    fn test_all_zero_scores_tie_for_first() {
        let roster = roster();
        let standings = ledger().standings(&roster);
        assert_eq!(
            ranks(&standings),
            vec![("Andrea", 0, 1), ("Marco", 0, 1), ("Martino", 0, 1)]
        );
        assert!(standings.iter().all(|s| s.medal == Medal::Gold));
    }

    #[test]
    fn test_ties_share_rank_and_keep_roster_order() {
        let roster = roster();
        let mut ledger = ledger();
        ledger.record_completion(&roster, "Martino", &["Laundry"], at(8)).unwrap();
        ledger.record_completion(&roster, "Marco", &["Laundry"], at(9)).unwrap();

        let standings = ledger.standings(&roster);
        assert_eq!(
            ranks(&standings),
            vec![("Marco", 3, 1), ("Martino", 3, 1), ("Andrea", 0, 3)]
        );
        assert_eq!(standings[1].medal, Medal::Gold);
        assert_eq!(standings[2].medal, Medal::Bronze);
    }

    #[test]
    fn test_unknown_chore_leaves_ledger_untouched() {
        let roster = roster();
        let mut ledger = ledger();
        let before = ledger.clone();

        let err = ledger
            .record_completion(&roster, "Andrea", &["Dishes", "Windows"], at(8))
            .unwrap_err();

        assert!(matches!(
            err,
            HouseholdError::UnknownEntity {
                kind: EntityKind::Chore,
                ..
            }
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_unknown_member_is_rejected() {
        let roster = roster();
        let mut ledger = ledger();
        assert!(ledger
            .record_completion(&roster, "Giulia", &["Dishes"], at(8))
            .is_err());
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn test_event_uses_canonical_names_and_is_prepended() {
        let roster = roster();
        let mut ledger = ledger();
        ledger.record_completion(&roster, "marco", &["dishes"], at(8)).unwrap();
        let event = ledger
            .record_completion(&roster, "Andrea", &["Laundry", "Dishes", "laundry"], at(9))
            .unwrap()
            .clone();

        assert_eq!(event.member.name(), "Andrea");
        assert_eq!(event.chores, vec!["Laundry", "Dishes"]);
        assert_eq!(ledger.history()[0], event);
        assert_eq!(ledger.history()[1].member.name(), "Marco");
        assert_eq!(ledger.score(&roster.resolve("Andrea").unwrap()), 5);
    }

    #[test]
    fn test_empty_selection_records_event_without_points() {
        let roster = roster();
        let mut ledger = ledger();
        let names: [&str; 0] = [];
        ledger.record_completion(&roster, "Andrea", &names, at(8)).unwrap();

        assert_eq!(ledger.history().len(), 1);
        assert!(ledger.history()[0].chores.is_empty());
        assert_eq!(ledger.score(&roster.resolve("Andrea").unwrap()), 0);
    }

    #[test]
    fn test_revoke_completion_takes_points_back() {
        let roster = roster();
        let mut ledger = ledger();
        ledger.record_completion(&roster, "Andrea", &["Dishes"], at(8)).unwrap();
        ledger
            .record_completion(&roster, "Andrea", &["Dishes", "Laundry"], at(9))
            .unwrap();

        let revoked = ledger.revoke_completion(0).unwrap();
        assert_eq!(revoked.chores, vec!["Dishes", "Laundry"]);
        assert_eq!(ledger.history().len(), 1);
        assert_eq!(ledger.score(&roster.resolve("Andrea").unwrap()), 2);

        assert!(ledger.revoke_completion(5).is_err());
    }

    #[test]
    fn test_revoke_never_goes_below_zero() {
        let roster = roster();
        let andrea = roster.resolve("Andrea").unwrap();
        let event = ChoreCompletionEvent {
            member: andrea.clone(),
            timestamp: at(8),
            chores: vec!["Dishes".to_string(), "Gone".to_string()],
        };
        let mut ledger = ChoreLedger::new(vec![Chore::new("Dishes", 2)], vec![event]);

        ledger.revoke_completion(0).unwrap();
        assert_eq!(ledger.chores()[0].completions_by(&andrea), 0);
    }

    #[test]
    fn test_recent_history_is_capped() {
        let roster = roster();
        let mut ledger = ledger();
        for hour in 0..12 {
            ledger.record_completion(&roster, "Marco", &["Dishes"], at(hour)).unwrap();
        }
        assert_eq!(ledger.history().len(), 12);
        let recent = ledger.recent_history(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].timestamp, at(11));
    }
}
