//! Common test utilities and helpers


/// Raw API payload builders
pub mod fixtures {
    use serde_json::{json, Value};

    /// A sponsor-listing item
    pub fn profile(id: &str, name: &str, avatar: &str) -> Value {
        json!({"user": {"user_id": id, "name": name, "avatar": avatar}})
    }

    /// An order-listing item with only an id and a pay time
    pub fn order(id: &str, paid_at: i64) -> Value {
        json!({"user_id": id, "last_pay_time": paid_at})
    }

    /// A successful page envelope
    pub fn page(items: Vec<Value>, total_page: u32) -> Value {
        json!({
            "ec": 200,
            "em": "",
            "data": {"list": items, "total_page": total_page}
        })
    }
}

/// Logging utilities for tests. Subscriber setup is done by `test_log`.
pub mod logging {
    use tracing::{debug, info};

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
