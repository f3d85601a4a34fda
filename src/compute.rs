use crate::data::{Amount, Entry, Expense, Income, Records};

/// Sums wrap around at the integer width instead of panicking.
pub(crate) fn sum(amounts: impl IntoIterator<Item = Amount>) -> Amount {
    amounts.into_iter().fold(0, Amount::wrapping_add)
}

/// Running sums of the Load table columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntryTotals {
    pub quantity: Amount,
    pub paid: Amount,
    pub to_paid: Amount,
    pub collection: Amount,
}

impl EntryTotals {
    pub fn add(&mut self, entry: &Entry) {
        self.quantity = self.quantity.wrapping_add(entry.quantity);
        self.paid = self.paid.wrapping_add(entry.paid);
        self.to_paid = self.to_paid.wrapping_add(entry.to_paid);
        self.collection = self.collection.wrapping_add(entry.collection);
    }
}

/// Sums for every section of the report. All of them start at zero, so an
/// empty file simply contributes nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Totals {
    pub entries: EntryTotals,
    pub expense: Amount,
    pub income: Amount,
}

impl Totals {
    pub fn compute(entries: &[Entry], expenses: &[Expense], incomes: &[Income]) -> Self {
        let mut totals = Self::default();
        entries.iter().for_each(|entry| totals.entries.add(entry));
        totals.expense = sum(expenses.iter().map(|expense| expense.amount));
        totals.income = sum(incomes.iter().map(|income| income.amount));
        totals
    }

    pub fn of(records: &Records) -> Self {
        Self::compute(&records.entries, &records.expenses, &records.incomes)
    }

    pub fn account(&self) -> AccountSummary {
        let paid_plus_collection = self.entries.paid.wrapping_add(self.entries.collection);
        AccountSummary {
            paid_plus_collection,
            total_income: self.income,
            total_expense: self.expense,
            profit: paid_plus_collection
                .wrapping_add(self.income)
                .wrapping_sub(self.expense),
            not_paid: self.entries.to_paid.wrapping_sub(self.entries.collection),
        }
    }
}

/// The figures of the Account table. `not_paid` goes negative when more was
/// collected than was owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AccountSummary {
    pub paid_plus_collection: Amount,
    pub total_income: Amount,
    pub total_expense: Amount,
    pub profit: Amount,
    pub not_paid: Amount,
}
