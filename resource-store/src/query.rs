//! Builder for the filter/order/limit query strings the resource API understands
//! (`field=eq.value`, `order=field.desc`, `limit=n`, `select=*`).

/// Sort direction for `order=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// A read against one table. Parameters keep insertion order.
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: &'static str,
    params: Vec<(&'static str, String)>,
}

impl TableQuery {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            params: Vec::new(),
        }
    }

    /// `field=eq.value`; the value is percent-encoded.
    pub fn eq(mut self, field: &'static str, value: &str) -> Self {
        self.params
            .push((field, format!("eq.{}", urlencoding::encode(value))));
        self
    }

    pub fn select_all(mut self) -> Self {
        self.params.push(("select", "*".to_string()));
        self
    }

    pub fn order(mut self, field: &'static str, order: Order) -> Self {
        self.params
            .push(("order", format!("{field}.{}", order.as_str())));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit", n.to_string()));
        self
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    /// Path relative to the REST root, e.g. `responses?id=eq.5&select=*`.
    pub fn to_path(&self) -> String {
        if self.params.is_empty() {
            return self.table.to_string();
        }
        let qs = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.table, qs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtered_read_path() {
        let q = TableQuery::table("responses").eq("id", "42").select_all();
        assert_eq!(q.to_path(), "responses?id=eq.42&select=*");
    }

    #[test]
    fn trending_path_keeps_parameter_order() {
        let q = TableQuery::table("responses")
            .select_all()
            .order("created_at", Order::Desc)
            .limit(10);
        assert_eq!(
            q.to_path(),
            "responses?select=*&order=created_at.desc&limit=10"
        );
    }

    #[test]
    fn filter_values_are_encoded() {
        let q = TableQuery::table("questions").eq("user_id", "a&b=c d");
        assert_eq!(q.to_path(), "questions?user_id=eq.a%26b%3Dc%20d");
    }
}
