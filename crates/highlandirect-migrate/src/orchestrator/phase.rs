//! Migration state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress of a migration run.
///
/// States advance strictly in declaration order. `Failed` is reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    NotStarted,
    Connected,
    SchemaReady,
    CustomersDone,
    ProductsDone,
    StoresDone,
    OrdersDone,
    MemosDone,
    Complete,
    Failed,
}

impl MigrationPhase {
    /// The state after this one on the success path.
    pub fn next(self) -> Option<MigrationPhase> {
        use MigrationPhase::*;
        match self {
            NotStarted => Some(Connected),
            Connected => Some(SchemaReady),
            SchemaReady => Some(CustomersDone),
            CustomersDone => Some(ProductsDone),
            ProductsDone => Some(StoresDone),
            StoresDone => Some(OrdersDone),
            OrdersDone => Some(MemosDone),
            MemosDone => Some(Complete),
            Complete | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MigrationPhase::Complete | MigrationPhase::Failed)
    }

    /// Whether moving from `self` to `to` is allowed.
    pub fn can_transition(self, to: MigrationPhase) -> bool {
        if to == MigrationPhase::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }

    /// Entity family handled by the step that ends in this state.
    pub fn entity(self) -> Option<&'static str> {
        match self {
            MigrationPhase::CustomersDone => Some("customers"),
            MigrationPhase::ProductsDone => Some("products"),
            MigrationPhase::StoresDone => Some("stores"),
            MigrationPhase::OrdersDone => Some("orders"),
            MigrationPhase::MemosDone => Some("report_memos"),
            _ => None,
        }
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationPhase::NotStarted => "not_started",
            MigrationPhase::Connected => "connected",
            MigrationPhase::SchemaReady => "schema_ready",
            MigrationPhase::CustomersDone => "customers_done",
            MigrationPhase::ProductsDone => "products_done",
            MigrationPhase::StoresDone => "stores_done",
            MigrationPhase::OrdersDone => "orders_done",
            MigrationPhase::MemosDone => "memos_done",
            MigrationPhase::Complete => "complete",
            MigrationPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
