//! Handlebars helpers available to every template.
//!
//! Helpers return values (not writes), so they compose in subexpressions
//! like `{{#each (limit pages 10)}}`.

use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, ScopedJson,
};
use serde_json::Value;

/// Default human-readable date rendering, e.g. "August 10, 2019".
const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Register all helpers on a registry.
pub fn register(registry: &mut Handlebars<'_>) {
    registry.register_helper("limit", Box::new(LimitHelper));
    registry.register_helper("date", Box::new(DateHelper));
}

// ============================================================================
// limit
// ============================================================================

/// `{{#each (limit pages 10)}}`: first N elements of an array.
///
/// Non-array input yields an empty array, mirroring the lenient behavior
/// templates rely on for optional lists.
struct LimitHelper;

impl HelperDef for LimitHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let array = h
            .param(0)
            .and_then(|p| p.value().as_array())
            .cloned()
            .unwrap_or_default();
        let count = h
            .param(1)
            .and_then(|p| p.value().as_u64())
            .map(|n| n as usize)
            .unwrap_or(array.len());

        Ok(ScopedJson::Derived(Value::Array(
            array.into_iter().take(count).collect(),
        )))
    }
}

// ============================================================================
// date
// ============================================================================

/// `{{date page.date}}` or `{{date page.date "%Y"}}`: format an ISO
/// `YYYY-MM-DD` date for humans.
///
/// Unparseable input renders unchanged so a bad date degrades visibly in
/// the page instead of killing the build.
struct DateHelper;

impl HelperDef for DateHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let raw = h.param(0).and_then(|p| p.value().as_str()).unwrap_or_default();
        let format = h
            .param(1)
            .and_then(|p| p.value().as_str())
            .filter(|f| is_valid_strftime(f))
            .unwrap_or(DEFAULT_DATE_FORMAT);

        let date_part = raw.get(..10).unwrap_or(raw);
        let formatted = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map(|d| d.format(format).to_string())
            .unwrap_or_else(|_| raw.to_owned());

        Ok(ScopedJson::Derived(Value::String(formatted)))
    }
}

/// Reject format strings chrono would fail to render.
fn is_valid_strftime(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}
