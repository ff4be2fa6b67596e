use serde_json::{Map, Value};

/// Renderer configuration as a JSON object addressed by dotted paths
/// (e.g. `layout.mobileBreakpoint`).
#[derive(Debug, Clone, PartialEq)]
pub struct CanopyConfig(Value);

impl Default for CanopyConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl CanopyConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    /// Numbers are accepted as JSON numbers or numeric strings (`"750"`).
    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.lookup(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
            .filter(|n| n.is_finite())
    }

    /// Writes `value` at `dotted_path`, replacing any non-object met on the way.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let slot = dotted_path.split('.').fold(&mut self.0, field_mut);
        *slot = value;
    }

    /// Overlays `other`: objects merge key by key, anything else replaces what it lands on.
    pub fn deep_merge(&mut self, other: &Value) {
        let mut work: Vec<(&mut Value, &Value)> = vec![(&mut self.0, other)];
        while let Some(pair) = work.pop() {
            match pair {
                (Value::Object(into), Value::Object(from)) => {
                    for key in from.keys() {
                        if !into.contains_key(key) {
                            into.insert(key.clone(), Value::Null);
                        }
                    }
                    for (key, slot) in into.iter_mut() {
                        if let Some(incoming) = from.get(key) {
                            work.push((slot, incoming));
                        }
                    }
                }
                (slot, incoming) => *slot = incoming.clone(),
            }
        }
    }
}

/// The `key` member of `slot`, turning `slot` into an object first if it is not one.
fn field_mut<'a>(slot: &'a mut Value, key: &str) -> &'a mut Value {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map.entry(key).or_insert(Value::Null),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_value_creates_intermediate_objects() {
        let mut cfg = CanopyConfig::default();
        cfg.set_value("animation.durationMs", json!(300));
        assert_eq!(cfg.get_f64("animation.durationMs"), Some(300.0));
        assert_eq!(cfg.get_f64("animation.missing"), None);
    }

    #[test]
    fn set_value_replaces_scalar_parents() {
        let mut cfg = CanopyConfig::from_value(json!({ "layout": 3 }));
        cfg.set_value("layout.mobileBreakpoint", json!(600));
        assert_eq!(cfg.get_f64("layout.mobileBreakpoint"), Some(600.0));
    }

    #[test]
    fn deep_merge_keeps_untouched_siblings() {
        let mut cfg = CanopyConfig::from_value(json!({
            "layout": { "baseFontSize": 16, "mobileBreakpoint": 768 },
            "identity": { "scope": "instance" }
        }));
        cfg.deep_merge(&json!({ "layout": { "mobileBreakpoint": 640 } }));
        assert_eq!(cfg.get_f64("layout.baseFontSize"), Some(16.0));
        assert_eq!(cfg.get_f64("layout.mobileBreakpoint"), Some(640.0));
        assert_eq!(cfg.get_str("identity.scope"), Some("instance"));
    }

    #[test]
    fn set_value_on_a_scalar_root_starts_a_fresh_object() {
        let mut cfg = CanopyConfig::from_value(json!("nope"));
        cfg.set_value("svg.id", json!("tree"));
        assert_eq!(cfg.as_value(), &json!({ "svg": { "id": "tree" } }));
    }

    #[test]
    fn deep_merge_swaps_objects_and_scalars() {
        let mut cfg = CanopyConfig::from_value(json!({
            "layout": { "baseFontSize": 16 },
            "animation": 0
        }));
        cfg.deep_merge(&json!({
            "layout": null,
            "animation": { "durationMs": 120 },
            "svg": { "id": "x" }
        }));
        assert_eq!(
            cfg.as_value(),
            &json!({
                "layout": null,
                "animation": { "durationMs": 120 },
                "svg": { "id": "x" }
            })
        );
    }

    #[test]
    fn deep_merge_handles_long_chains() {
        let mut base = json!({ "leaf": 1 });
        let mut incoming = json!({ "other": 2 });
        for _ in 0..500 {
            base = json!({ "next": base });
            incoming = json!({ "next": incoming });
        }
        let mut cfg = CanopyConfig::from_value(base);
        cfg.deep_merge(&incoming);
        let path = vec!["next"; 500].join(".");
        assert_eq!(cfg.get_f64(&format!("{path}.leaf")), Some(1.0));
        assert_eq!(cfg.get_f64(&format!("{path}.other")), Some(2.0));
    }

    #[test]
    fn numeric_strings_are_read_as_numbers() {
        let cfg = CanopyConfig::from_value(json!({ "animation": { "durationMs": " 250 " } }));
        assert_eq!(cfg.get_f64("animation.durationMs"), Some(250.0));
    }
}
