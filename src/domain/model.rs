use crate::utils::error::{HouseholdError, Result};
use crate::utils::validation::{name_key, validate_list_name};
use chrono::NaiveDateTime;
use std::fmt;

/// Format used for every timestamp written to the store.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M";

/// Separator for lists stored inside a single cell.
pub const LIST_SEPARATOR: &str = ", ";

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A household member, always spelled the way the roster spells it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Member(String);

impl Member {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed, closed set of members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members: Vec<Member> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(HouseholdError::EmptyInput {
                    field: "member name".to_string(),
                });
            }
            validate_list_name("household.members", name)?;
            if members.iter().any(|m| name_key(&m.0) == name_key(name)) {
                return Err(HouseholdError::ConfigValidationError {
                    field: "household.members".to_string(),
                    message: format!("'{}' is listed twice", name),
                });
            }
            members.push(Member(name.to_string()));
        }
        if members.is_empty() {
            return Err(HouseholdError::ConfigValidationError {
                field: "household.members".to_string(),
                message: "the roster needs at least one member".to_string(),
            });
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn position(&self, member: &Member) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }

    /// Case-insensitive lookup.
    pub fn find(&self, name: &str) -> Option<&Member> {
        let key = name_key(name);
        self.members.iter().find(|m| name_key(&m.0) == key)
    }

    pub fn resolve(&self, name: &str) -> Result<Member> {
        self.find(name)
            .cloned()
            .ok_or_else(|| HouseholdError::unknown_member(name.trim()))
    }

    /// Resolves every name, drops repeats and returns the set in roster order.
    pub fn resolve_set<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Member>> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let member = self.resolve(name.as_ref())?;
            if !resolved.contains(&member) {
                resolved.push(member);
            }
        }
        resolved.sort_by_key(|m| self.position(m));
        Ok(resolved)
    }

    /// True when `members` is exactly the whole roster, in any order.
    pub fn is_everyone(&self, members: &[Member]) -> bool {
        self.members.iter().all(|m| members.contains(m))
            && members.iter().all(|m| self.members.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roster() -> Roster {
        Roster::new(["Andrea", "Marco", "Martino"]).unwrap()
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_canonical() {
        let roster = roster();
        assert_eq!(roster.resolve(" marco ").unwrap().name(), "Marco");
        assert!(matches!(
            roster.resolve("Mar"),
            Err(HouseholdError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_resolve_set_orders_by_roster_and_dedupes() {
        let roster = roster();
        let set = roster
            .resolve_set(&["martino", "Andrea", "MARTINO"])
            .unwrap();
        let names: Vec<&str> = set.iter().map(Member::name).collect();
        assert_eq!(names, vec!["Andrea", "Martino"]);
    }

    #[test]
    fn test_is_everyone_uses_set_equality() {
        let roster = roster();
        let all = roster.resolve_set(&["Martino", "Marco", "Andrea"]).unwrap();
        assert!(roster.is_everyone(&all));

        let some = roster.resolve_set(&["Marco", "Martino"]).unwrap();
        assert!(!roster.is_everyone(&some));
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        assert!(Roster::new(["Andrea", "andrea"]).is_err());
        assert!(Roster::new(Vec::<String>::new()).is_err());
        assert!(Roster::new(["Élodie", "élodie"]).is_err());
    }

    #[test]
    fn test_non_ascii_names_match_ignoring_case() {
        let roster = Roster::new(["Élodie", "Marco"]).unwrap();
        assert_eq!(roster.resolve("élodie").unwrap().name(), "Élodie");
    }

    #[test]
    fn test_roster_rejects_names_with_commas() {
        assert!(matches!(
            Roster::new(["Andrea", "Rossi, Mario"]),
            Err(HouseholdError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_timestamp_format_round_trips() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        assert_eq!(format_timestamp(&ts), "09/03/2024, 18:05");
        assert_eq!(parse_timestamp("09/03/2024, 18:05"), Some(ts));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_split_list_skips_blanks() {
        assert_eq!(
            split_list("Dishes, Laundry,  ,Trash"),
            vec!["Dishes", "Laundry", "Trash"]
        );
        assert!(split_list("").is_empty());
    }
}
