//! Shared payments and the running balance of every member.
//!
//! A positive balance means the member is owed money, a negative one that
//! they owe. Every payment credits the payer with the full amount and debits
//! the beneficiaries with shares that add up to the same amount, so the
//! balances always sum to zero.

use crate::domain::model::{Member, Roster, LIST_SEPARATOR};
use crate::domain::money::Money;
use crate::utils::error::{HouseholdError, Result};
use chrono::NaiveDateTime;

/// Label shown instead of the names when everyone benefits.
pub const EVERYONE_LABEL: &str = "Everyone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub member: Member,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtTransaction {
    pub payer: Member,
    pub amount: Money,
    pub beneficiaries: Vec<Member>,
    pub timestamp: NaiveDateTime,
    pub reason: String,
}

impl DebtTransaction {
    pub fn beneficiaries_label(&self, roster: &Roster) -> String {
        beneficiaries_label(roster, &self.beneficiaries)
    }
}

pub fn beneficiaries_label(roster: &Roster, beneficiaries: &[Member]) -> String {
    if roster.is_everyone(beneficiaries) {
        EVERYONE_LABEL.to_string()
    } else {
        beneficiaries
            .iter()
            .map(Member::name)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR)
    }
}

/// A payment as entered by a member, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub payer: String,
    pub amount: Money,
    pub beneficiaries: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtLedger {
    balances: Vec<Balance>,
    history: Vec<DebtTransaction>,
}

impl DebtLedger {
    /// Lines balances up with the roster; members without a stored balance
    /// start at zero.
    pub fn new(roster: &Roster, balances: Vec<Balance>, history: Vec<DebtTransaction>) -> Self {
        let balances = roster
            .members()
            .iter()
            .map(|member| Balance {
                member: member.clone(),
                amount: balances
                    .iter()
                    .find(|b| &b.member == member)
                    .map(|b| b.amount)
                    .unwrap_or(Money::ZERO),
            })
            .collect();
        Self { balances, history }
    }

    pub fn empty(roster: &Roster) -> Self {
        Self::new(roster, Vec::new(), Vec::new())
    }

    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    pub fn balance_of(&self, member: &Member) -> Money {
        self.balances
            .iter()
            .find(|b| &b.member == member)
            .map(|b| b.amount)
            .unwrap_or(Money::ZERO)
    }

    pub fn history(&self) -> &[DebtTransaction] {
        &self.history
    }

    pub fn recent_history(&self, limit: usize) -> &[DebtTransaction] {
        &self.history[..self.history.len().min(limit)]
    }

    pub fn total(&self) -> Money {
        self.balances.iter().map(|b| b.amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == Money::ZERO
    }

    pub fn into_parts(self) -> (Vec<Balance>, Vec<DebtTransaction>) {
        (self.balances, self.history)
    }

    /// Records that `payer` paid `amount` for `beneficiaries`.
    ///
    /// A payer listed among the beneficiaries carries their own share, so
    /// paying 30 for all three members nets the payer +20.
    pub fn record_payment(
        &mut self,
        roster: &Roster,
        request: &PaymentRequest,
        timestamp: NaiveDateTime,
    ) -> Result<&DebtTransaction> {
        if request.beneficiaries.is_empty()
            || !request.amount.is_positive()
            || request.reason.trim().is_empty()
        {
            return Err(HouseholdError::IncompleteForm);
        }

        let payer = roster.resolve(&request.payer)?;
        let beneficiaries = roster.resolve_set(request.beneficiaries.as_slice())?;
        let shares = request.amount.split_evenly(beneficiaries.len());
        let total_before = self.total();

        let mut balances = self.balances.clone();
        adjust(&mut balances, &payer, request.amount, request.amount)?;
        for (member, share) in beneficiaries.iter().zip(shares) {
            adjust(&mut balances, member, -share, request.amount)?;
        }
        self.balances = balances;
        debug_assert_eq!(self.total(), total_before);

        let transaction = DebtTransaction {
            payer,
            amount: request.amount,
            beneficiaries,
            timestamp,
            reason: request.reason.trim().to_string(),
        };
        tracing::debug!(
            payer = %transaction.payer,
            amount = %transaction.amount,
            beneficiaries = transaction.beneficiaries.len(),
            "Recorded payment"
        );
        self.history.insert(0, transaction);
        Ok(&self.history[0])
    }
}

/// Applies `delta` to a member's balance, refusing to leave the cents range.
fn adjust(balances: &mut [Balance], member: &Member, delta: Money, amount: Money) -> Result<()> {
    if let Some(balance) = balances.iter_mut().find(|b| &b.member == member) {
        balance.amount = balance
            .amount
            .checked_add(delta)
            .ok_or_else(|| HouseholdError::InvalidAmount {
                value: amount.to_string(),
                reason: format!("{}'s balance would be too large", member),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roster() -> Roster {
        Roster::new(["Andrea", "Marco", "Martino"]).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(20, 30, 0)
            .unwrap()
    }

    fn payment(payer: &str, amount: &str, beneficiaries: &[&str], reason: &str) -> PaymentRequest {
        PaymentRequest {
            payer: payer.to_string(),
            amount: Money::parse(amount).unwrap(),
            beneficiaries: beneficiaries.iter().map(|s| s.to_string()).collect(),
            reason: reason.to_string(),
        }
    }

    fn amounts(ledger: &DebtLedger) -> Vec<String> {
        ledger.balances().iter().map(|b| b.amount.to_string()).collect()
    }

    #[test]
    fn test_payment_scenario() {
        let roster = roster();
        let mut ledger = DebtLedger::empty(&roster);
        ledger
            .record_payment(&roster, &payment("Andrea", "30", &["Marco", "Martino"], "Groceries"), now())
            .unwrap();

        assert_eq!(amounts(&ledger), vec!["30.00", "-15.00", "-15.00"]);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn test_payer_among_beneficiaries_nets_own_share() {
        let roster = roster();
        let mut ledger = DebtLedger::empty(&roster);
        ledger
            .record_payment(
                &roster,
                &payment("Marco", "30", &["Andrea", "Marco", "Martino"], "Internet"),
                now(),
            )
            .unwrap();

        assert_eq!(amounts(&ledger), vec!["-10.00", "20.00", "-10.00"]);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn test_uneven_split_stays_balanced() {
        let roster = roster();
        let mut ledger = DebtLedger::empty(&roster);
        ledger
            .record_payment(&roster, &payment("Martino", "10", &["Andrea", "Marco", "Martino"], "Pizza"), now())
            .unwrap();
        ledger
            .record_payment(&roster, &payment("Andrea", "0.05", &["Marco", "Martino"], "Stamp"), now())
            .unwrap();
        ledger
            .record_payment(&roster, &payment("Marco", "7.77", &["Andrea"], "Cinema"), now())
            .unwrap();

        assert_eq!(ledger.total(), Money::ZERO);
        assert_eq!(ledger.history().len(), 3);
        assert_eq!(ledger.history()[0].reason, "Cinema");
    }

    #[test]
    fn test_incomplete_form_is_a_single_error() {
        let roster = roster();
        let mut ledger = DebtLedger::empty(&roster);

        let no_beneficiaries = payment("Andrea", "10", &[], "Gas");
        let zero_amount = payment("Andrea", "0", &["Marco"], "Gas");
        let negative = payment("Andrea", "-4", &["Marco"], "Gas");
        let blank_reason = payment("Andrea", "10", &["Marco"], "  ");

        for request in [no_beneficiaries, zero_amount, negative, blank_reason] {
            assert!(matches!(
                ledger.record_payment(&roster, &request, now()),
                Err(HouseholdError::IncompleteForm)
            ));
        }
        assert!(ledger.history().is_empty());
        assert_eq!(ledger.total(), Money::ZERO);
    }

    #[test]
    fn test_unknown_beneficiary_aborts_without_changes() {
        let roster = roster();
        let mut ledger = DebtLedger::empty(&roster);
        let before = ledger.clone();

        let err = ledger
            .record_payment(&roster, &payment("Andrea", "12", &["Marco", "Giulia"], "Gift"), now())
            .unwrap_err();
        assert!(matches!(err, HouseholdError::UnknownEntity { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_balance_overflow_is_rejected_without_changes() {
        let roster = roster();
        let mut ledger = DebtLedger::empty(&roster);
        let huge = payment("Andrea", "90000000000000000", &["Marco"], "Lottery");

        ledger.record_payment(&roster, &huge, now()).unwrap();
        let before = ledger.clone();

        let err = ledger.record_payment(&roster, &huge, now()).unwrap_err();
        assert!(matches!(err, HouseholdError::InvalidAmount { .. }));
        assert_eq!(ledger, before);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn test_new_lines_balances_up_with_roster() {
        let roster = roster();
        let marco = roster.resolve("Marco").unwrap();
        let ledger = DebtLedger::new(
            &roster,
            vec![Balance {
                member: marco.clone(),
                amount: Money::from_cents(-250),
            }],
            Vec::new(),
        );

        assert_eq!(ledger.balances().len(), 3);
        assert_eq!(ledger.balances()[0].member.name(), "Andrea");
        assert_eq!(ledger.balance_of(&marco), Money::from_cents(-250));
    }

    #[test]
    fn test_everyone_label_uses_set_equality() {
        let roster = roster();
        let everyone = roster.resolve_set(&["Martino", "Andrea", "Marco"]).unwrap();
        assert_eq!(beneficiaries_label(&roster, &everyone), "Everyone");

        let two = roster.resolve_set(&["Martino", "Andrea"]).unwrap();
        assert_eq!(beneficiaries_label(&roster, &two), "Andrea, Martino");
    }
}
