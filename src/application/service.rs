use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::domain::{
    BudgetAnalysis, CategorySet, Cents, ExpenseShare, Record, RecordForm, RecordId, Totals,
    by_category, expense_shares, filter_by_keyword, monthly, records_in_month, totals,
};
use crate::storage::Repository;

use super::AppError;

/// The ledger store: owns the ordered record sequence and the category set and
/// keeps both files in step with them.
///
/// Every successful mutation rewrites the whole ledger file. The mutation is
/// built on a copy and only becomes visible in memory once the write has
/// succeeded, so a failed save leaves memory and file in agreement.
pub struct LedgerService {
    repo: Repository,
    records: Vec<Record>,
    categories: CategorySet,
    next_id: RecordId,
}

impl LedgerService {
    /// Create an empty service over `repo` without reading any file.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            records: Vec::new(),
            categories: CategorySet::defaults(),
            next_id: 1,
        }
    }

    /// Create a service and load both the ledger and the category files.
    pub fn open(repo: Repository) -> Result<Self, AppError> {
        let mut service = Self::new(repo);
        service.load()?;
        service.load_categories()?;
        Ok(service)
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Record operations
    // ========================

    /// Replace the in-memory sequence with the contents of the ledger file.
    /// A missing file yields an empty ledger. On error nothing changes.
    pub fn load(&mut self) -> Result<usize, AppError> {
        let mut loaded = self.repo.load_records()?.unwrap_or_default();
        for record in &mut loaded {
            record.id = self.allocate_id();
        }
        self.records = loaded;
        Ok(self.records.len())
    }

    /// Write the whole sequence to the ledger file.
    pub fn save(&self) -> Result<(), AppError> {
        self.repo.save_records(&self.records)?;
        Ok(())
    }

    /// Records in ledger order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn record(&self, id: RecordId) -> Result<&Record, AppError> {
        self.get(id).ok_or(AppError::RecordNotFound(id))
    }

    /// Validate `form` and append it to the ledger.
    pub fn add(&mut self, form: &RecordForm) -> Result<Record, AppError> {
        let mut record = form.validate()?;
        record.id = self.next_id;

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;
        self.next_id += 1;

        debug!(id = record.id, "Added record");
        Ok(record)
    }

    /// Replace the content of record `id` with `form`, keeping its id and position.
    pub fn update(&mut self, id: RecordId, form: &RecordForm) -> Result<Record, AppError> {
        let mut record = form.validate()?;
        record.id = id;

        let pos = self.position(id)?;
        let mut next = self.records.clone();
        next[pos] = record.clone();
        self.commit(next)?;

        debug!(id, "Updated record");
        Ok(record)
    }

    /// Change only the fields set in `form`; the rest of record `id` stays as
    /// it is and is not re-validated.
    pub fn edit(&mut self, id: RecordId, form: &RecordForm) -> Result<Record, AppError> {
        let pos = self.position(id)?;
        let record = form.apply_to(&self.records[pos])?;

        let mut next = self.records.clone();
        next[pos] = record.clone();
        self.commit(next)?;

        debug!(id, "Edited record");
        Ok(record)
    }

    /// Remove every record in `ids`. All ids are resolved before anything is
    /// removed: if one is unknown, nothing is deleted.
    pub fn delete(&mut self, ids: &[RecordId]) -> Result<Vec<Record>, AppError> {
        let targets: HashSet<RecordId> = ids.iter().copied().collect();
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(AppError::RecordNotFound(*missing));
        }

        let (removed, kept): (Vec<Record>, Vec<Record>) = self
            .records
            .iter()
            .cloned()
            .partition(|r| targets.contains(&r.id));
        self.commit(kept)?;

        debug!(count = removed.len(), "Deleted records");
        Ok(removed)
    }

    fn position(&self, id: RecordId) -> Result<usize, AppError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(AppError::RecordNotFound(id))
    }

    fn commit(&mut self, next: Vec<Record>) -> Result<(), AppError> {
        self.repo.save_records(&next)?;
        self.records = next;
        Ok(())
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ========================
    // Category operations
    // ========================

    /// Load the category file, falling back to the default set when it is missing.
    pub fn load_categories(&mut self) -> Result<usize, AppError> {
        self.categories = self
            .repo
            .load_categories()?
            .unwrap_or_else(CategorySet::defaults);
        Ok(self.categories.len())
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn add_category(&mut self, name: &str) -> Result<String, AppError> {
        let mut next = self.categories.clone();
        let name = next.insert(name)?;
        self.repo.save_categories(&next)?;
        self.categories = next;

        info!(category = %name, "Added category");
        Ok(name)
    }

    /// Remove a category from the set. Records using it are left as they are.
    pub fn delete_category(&mut self, name: &str) -> Result<(), AppError> {
        let mut next = self.categories.clone();
        next.remove(name)?;
        self.repo.save_categories(&next)?;
        self.categories = next;

        info!(category = %name.trim(), "Deleted category");
        Ok(())
    }

    // ========================
    // Summaries
    // ========================

    pub fn totals(&self) -> Totals {
        totals(&self.records)
    }

    pub fn search(&self, keyword: &str) -> Vec<Record> {
        filter_by_keyword(&self.records, keyword)
    }

    pub fn category_summary(&self) -> BTreeMap<String, Cents> {
        by_category(&self.records)
    }

    pub fn monthly_trend(&self) -> Vec<(String, Cents)> {
        monthly(&self.records)
    }

    pub fn expense_shares(&self) -> Vec<ExpenseShare> {
        expense_shares(&self.records)
    }

    pub fn records_in_month(&self, month: &str) -> Vec<Record> {
        records_in_month(&self.records, month)
    }

    pub fn budget_analysis(&self, month: &str, budget: Cents) -> BudgetAnalysis {
        BudgetAnalysis::for_month(&self.records, month, budget)
    }
}
