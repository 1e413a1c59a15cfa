// SPDX-License-Identifier: Apache-2.0

use crate::chaos::{ChaosPolicy, FailureSequence};
use nocap_model::{
    Activity, CapTable, Company, CompanyId, Compliance, Grant, GrantId, ScheduleId, Security,
    SecurityId, Stakeholder, StakeholderId, Transaction, TransactionId, Treasury, VestingSchedule,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    NotFound { entity: &'static str, id: String },
    Injected,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::Injected => f.write_str("simulated server error"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The whole "database": one ordered map per entity.
pub struct EquityStore {
    pub(crate) companies: Mutex<BTreeMap<CompanyId, Company>>,
    pub(crate) stakeholders: Mutex<BTreeMap<StakeholderId, Stakeholder>>,
    pub(crate) securities: Mutex<BTreeMap<SecurityId, Security>>,
    pub(crate) grants: Mutex<BTreeMap<GrantId, Grant>>,
    pub(crate) schedules: Mutex<BTreeMap<ScheduleId, VestingSchedule>>,
    pub(crate) transactions: Mutex<BTreeMap<TransactionId, Transaction>>,
    pub(crate) cap_tables: Mutex<BTreeMap<CompanyId, CapTable>>,
    pub(crate) treasuries: Mutex<BTreeMap<CompanyId, Treasury>>,
    pub(crate) compliance: Mutex<BTreeMap<CompanyId, Compliance>>,
    pub(crate) activities: Mutex<Vec<Activity>>,
    chaos: ChaosPolicy,
    failures: FailureSequence,
    id_seq: AtomicU64,
}

impl Default for EquityStore {
    fn default() -> Self {
        Self::new(ChaosPolicy::default())
    }
}

impl EquityStore {
    #[must_use]
    pub fn new(chaos: ChaosPolicy) -> Self {
        Self {
            companies: Mutex::new(BTreeMap::new()),
            stakeholders: Mutex::new(BTreeMap::new()),
            securities: Mutex::new(BTreeMap::new()),
            grants: Mutex::new(BTreeMap::new()),
            schedules: Mutex::new(BTreeMap::new()),
            transactions: Mutex::new(BTreeMap::new()),
            cap_tables: Mutex::new(BTreeMap::new()),
            treasuries: Mutex::new(BTreeMap::new()),
            compliance: Mutex::new(BTreeMap::new()),
            activities: Mutex::new(Vec::new()),
            chaos,
            failures: FailureSequence::new(),
            id_seq: AtomicU64::new(1),
        }
    }

    /// Process-unique id for a created record, `{prefix}-{seq}`.
    #[must_use]
    pub fn next_id(&self, prefix: &str) -> String {
        let seq = self.id_seq.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{seq:04}")
    }

    async fn gate(&self) -> Result<(), StoreError> {
        if !self.chaos.mock_delay.is_zero() {
            tokio::time::sleep(self.chaos.mock_delay).await;
        }
        if self.failures.should_fail(self.chaos.failure_rate_pct) {
            return Err(StoreError::Injected);
        }
        Ok(())
    }

    // Companies: read and update only; creation/deletion is not part of the
    // demo surface.

    pub async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        self.gate().await?;
        Ok(self.companies.lock().await.values().cloned().collect())
    }

    pub async fn get_company(&self, id: &CompanyId) -> Result<Company, StoreError> {
        self.gate().await?;
        lookup(&*self.companies.lock().await, id, "company")
    }

    pub async fn update_company(&self, company: Company) -> Result<Company, StoreError> {
        self.gate().await?;
        let mut map = self.companies.lock().await;
        if !map.contains_key(&company.id) {
            return Err(StoreError::NotFound {
                entity: "company",
                id: company.id.to_string(),
            });
        }
        map.insert(company.id.clone(), company.clone());
        Ok(company)
    }

    pub(crate) async fn insert_company(&self, company: Company) {
        self.companies
            .lock()
            .await
            .insert(company.id.clone(), company);
    }

    // Stakeholders: full CRUD.

    pub async fn list_stakeholders(&self) -> Result<Vec<Stakeholder>, StoreError> {
        self.gate().await?;
        Ok(self.stakeholders.lock().await.values().cloned().collect())
    }

    pub async fn get_stakeholder(&self, id: &StakeholderId) -> Result<Stakeholder, StoreError> {
        self.gate().await?;
        lookup(&*self.stakeholders.lock().await, id, "stakeholder")
    }

    /// Lookup without the chaos gate, for rule evaluation joins.
    pub async fn find_stakeholder(&self, id: &StakeholderId) -> Option<Stakeholder> {
        self.stakeholders.lock().await.get(id).cloned()
    }

    pub async fn create_stakeholder(
        &self,
        stakeholder: Stakeholder,
    ) -> Result<Stakeholder, StoreError> {
        self.gate().await?;
        self.stakeholders
            .lock()
            .await
            .insert(stakeholder.id.clone(), stakeholder.clone());
        Ok(stakeholder)
    }

    pub async fn update_stakeholder(
        &self,
        stakeholder: Stakeholder,
    ) -> Result<Stakeholder, StoreError> {
        self.gate().await?;
        let mut map = self.stakeholders.lock().await;
        if !map.contains_key(&stakeholder.id) {
            return Err(StoreError::NotFound {
                entity: "stakeholder",
                id: stakeholder.id.to_string(),
            });
        }
        map.insert(stakeholder.id.clone(), stakeholder.clone());
        Ok(stakeholder)
    }

    pub async fn delete_stakeholder(&self, id: &StakeholderId) -> Result<(), StoreError> {
        self.gate().await?;
        match self.stakeholders.lock().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                entity: "stakeholder",
                id: id.to_string(),
            }),
        }
    }

    // Securities.

    pub async fn list_securities(&self) -> Result<Vec<Security>, StoreError> {
        self.gate().await?;
        Ok(self.securities.lock().await.values().cloned().collect())
    }

    pub async fn get_security(&self, id: &SecurityId) -> Result<Security, StoreError> {
        self.gate().await?;
        lookup(&*self.securities.lock().await, id, "security")
    }

    pub async fn create_security(&self, security: Security) -> Result<Security, StoreError> {
        self.gate().await?;
        self.securities
            .lock()
            .await
            .insert(security.id.clone(), security.clone());
        Ok(security)
    }

    pub async fn update_security(&self, security: Security) -> Result<Security, StoreError> {
        self.gate().await?;
        let mut map = self.securities.lock().await;
        if !map.contains_key(&security.id) {
            return Err(StoreError::NotFound {
                entity: "security",
                id: security.id.to_string(),
            });
        }
        map.insert(security.id.clone(), security.clone());
        Ok(security)
    }

    // Grants.

    pub async fn list_grants(&self) -> Result<Vec<Grant>, StoreError> {
        self.gate().await?;
        Ok(self.grants.lock().await.values().cloned().collect())
    }

    pub async fn list_grants_for_stakeholder(
        &self,
        stakeholder: &StakeholderId,
    ) -> Result<Vec<Grant>, StoreError> {
        self.gate().await?;
        Ok(self
            .grants
            .lock()
            .await
            .values()
            .filter(|g| &g.stakeholder_id == stakeholder)
            .cloned()
            .collect())
    }

    pub async fn get_grant(&self, id: &GrantId) -> Result<Grant, StoreError> {
        self.gate().await?;
        lookup(&*self.grants.lock().await, id, "grant")
    }

    pub async fn create_grant(&self, grant: Grant) -> Result<Grant, StoreError> {
        self.gate().await?;
        self.grants
            .lock()
            .await
            .insert(grant.id.clone(), grant.clone());
        Ok(grant)
    }

    pub async fn update_grant(&self, grant: Grant) -> Result<Grant, StoreError> {
        self.gate().await?;
        let mut map = self.grants.lock().await;
        if !map.contains_key(&grant.id) {
            return Err(StoreError::NotFound {
                entity: "grant",
                id: grant.id.to_string(),
            });
        }
        map.insert(grant.id.clone(), grant.clone());
        Ok(grant)
    }

    // Vesting schedules.

    pub async fn list_schedules(&self) -> Result<Vec<VestingSchedule>, StoreError> {
        self.gate().await?;
        Ok(self.schedules.lock().await.values().cloned().collect())
    }

    pub async fn get_schedule(&self, id: &ScheduleId) -> Result<VestingSchedule, StoreError> {
        self.gate().await?;
        lookup(&*self.schedules.lock().await, id, "vesting schedule")
    }

    pub async fn create_schedule(
        &self,
        schedule: VestingSchedule,
    ) -> Result<VestingSchedule, StoreError> {
        self.gate().await?;
        self.schedules
            .lock()
            .await
            .insert(schedule.id.clone(), schedule.clone());
        Ok(schedule)
    }

    // Transactions.

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        self.gate().await?;
        Ok(self.transactions.lock().await.values().cloned().collect())
    }

    pub async fn list_transactions_for_stakeholder(
        &self,
        stakeholder: &StakeholderId,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.gate().await?;
        Ok(self
            .transactions
            .lock()
            .await
            .values()
            .filter(|t| {
                &t.to_stakeholder_id == stakeholder
                    || t.from_stakeholder_id.as_ref() == Some(stakeholder)
            })
            .cloned()
            .collect())
    }

    pub async fn get_transaction(&self, id: &TransactionId) -> Result<Transaction, StoreError> {
        self.gate().await?;
        lookup(&*self.transactions.lock().await, id, "transaction")
    }

    pub async fn create_transaction(&self, tx: Transaction) -> Result<Transaction, StoreError> {
        self.gate().await?;
        self.transactions
            .lock()
            .await
            .insert(tx.id.clone(), tx.clone());
        Ok(tx)
    }

    // Per-company singletons.

    pub async fn list_cap_tables(&self) -> Result<Vec<CapTable>, StoreError> {
        self.gate().await?;
        Ok(self.cap_tables.lock().await.values().cloned().collect())
    }

    pub async fn get_cap_table(&self, company: &CompanyId) -> Result<CapTable, StoreError> {
        self.gate().await?;
        lookup(&*self.cap_tables.lock().await, company, "cap table")
    }

    pub async fn put_cap_table(&self, table: CapTable) -> Result<CapTable, StoreError> {
        self.gate().await?;
        self.cap_tables
            .lock()
            .await
            .insert(table.company_id.clone(), table.clone());
        Ok(table)
    }

    pub async fn get_treasury(&self, company: &CompanyId) -> Result<Treasury, StoreError> {
        self.gate().await?;
        lookup(&*self.treasuries.lock().await, company, "treasury")
    }

    pub(crate) async fn insert_treasury(&self, treasury: Treasury) {
        self.treasuries
            .lock()
            .await
            .insert(treasury.company_id.clone(), treasury);
    }

    /// Compliance falls back to a default record rather than a miss.
    pub async fn get_compliance(&self, company: &CompanyId) -> Result<Compliance, StoreError> {
        self.gate().await?;
        Ok(self
            .compliance
            .lock()
            .await
            .get(company)
            .cloned()
            .unwrap_or_else(|| Compliance::default_for(company.clone())))
    }

    pub(crate) async fn insert_compliance(&self, record: Compliance) {
        self.compliance
            .lock()
            .await
            .insert(record.company_id.clone(), record);
    }

    // Activity feed, newest first.

    pub async fn list_activities(&self, company: &CompanyId) -> Result<Vec<Activity>, StoreError> {
        self.gate().await?;
        let mut out: Vec<Activity> = self
            .activities
            .lock()
            .await
            .iter()
            .filter(|a| &a.company_id == company)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    pub async fn record_activity(&self, activity: Activity) -> Result<Activity, StoreError> {
        // Activities ride along with another mutation; no second chaos roll.
        self.activities.lock().await.push(activity.clone());
        Ok(activity)
    }
}

fn lookup<K: Ord + fmt::Display, V: Clone>(
    map: &BTreeMap<K, V>,
    key: &K,
    entity: &'static str,
) -> Result<V, StoreError> {
    map.get(key).cloned().ok_or_else(|| StoreError::NotFound {
        entity,
        id: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::ChaosPolicy;
    use nocap_model::{KycStatus, StakeholderType};
    use std::time::Duration;

    fn stakeholder(id: &str) -> Stakeholder {
        Stakeholder {
            id: StakeholderId::parse(id).expect("id"),
            name: "Jane Doe".to_string(),
            email: "jane@acme.io".to_string(),
            kind: StakeholderType::Employee,
            kyc_status: KycStatus::Verified,
            address: None,
            wallet_address: None,
            tax_id: None,
            accreditation_status: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn crud_round_trip_for_stakeholders() {
        let store = EquityStore::default();
        let created = store
            .create_stakeholder(stakeholder("emp-900"))
            .await
            .expect("create");
        let fetched = store.get_stakeholder(&created.id).await.expect("get");
        assert_eq!(fetched.email, "jane@acme.io");

        let mut updated = fetched.clone();
        updated.name = "Jane Q. Doe".to_string();
        store.update_stakeholder(updated).await.expect("update");
        assert_eq!(
            store
                .get_stakeholder(&created.id)
                .await
                .expect("get")
                .name,
            "Jane Q. Doe"
        );

        store.delete_stakeholder(&created.id).await.expect("delete");
        let err = store
            .get_stakeholder(&created.id)
            .await
            .expect_err("deleted");
        assert!(matches!(err, StoreError::NotFound { entity: "stakeholder", .. }));
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = EquityStore::default();
        let err = store
            .update_stakeholder(stakeholder("ghost"))
            .await
            .expect_err("missing");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn full_failure_rate_injects_errors() {
        let store = EquityStore::new(ChaosPolicy::new(Duration::ZERO, 100));
        let err = store.list_stakeholders().await.expect_err("injected");
        assert_eq!(err, StoreError::Injected);
    }

    #[tokio::test]
    async fn cap_table_snapshot_can_be_replaced() {
        use nocap_model::{CapTable, CapTableId};
        let store = EquityStore::default();
        let company = CompanyId::parse("acme-inc").expect("id");
        let table = CapTable {
            id: CapTableId::parse("acme-cap-table").expect("id"),
            company_id: company.clone(),
            as_of_date: time::macros::datetime!(2025-01-01 00:00 UTC),
            entries: Vec::new(),
            total_shares: 1_000,
            fully_diluted_shares: None,
            option_pool_size: None,
            treasury_shares: None,
            created_at: None,
            updated_at: None,
        };
        store.put_cap_table(table.clone()).await.expect("put");
        let mut replaced = table;
        replaced.total_shares = 2_000;
        store.put_cap_table(replaced).await.expect("replace");
        let fetched = store.get_cap_table(&company).await.expect("get");
        assert_eq!(fetched.total_shares, 2_000);
    }

    #[tokio::test]
    async fn compliance_defaults_when_absent() {
        let store = EquityStore::default();
        let company = CompanyId::parse("acme-inc").expect("id");
        let record = store.get_compliance(&company).await.expect("default");
        assert_eq!(record.score, 85);
        assert_eq!(record.ipo_readiness, Some(65));
    }

    #[tokio::test]
    async fn generated_ids_are_unique_and_prefixed() {
        let store = EquityStore::default();
        let a = store.next_id("stakeholder");
        let b = store.next_id("stakeholder");
        assert_ne!(a, b);
        assert!(a.starts_with("stakeholder-"));
    }
}
