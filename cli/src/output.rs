//! Rendering of the counter list and summary lines.

use tally_engine::Counter;

/// Render the projected view plus the two summary lines the widget shows:
/// `Showing N of M` (view length vs collection length) and `Total: T`
/// (sum over ALL counters, not just the visible ones).
pub fn render_list(visible: &[&Counter], collection_len: usize, total: i64) -> String {
    let mut out = String::new();
    if visible.is_empty() {
        out.push_str("No counters.\n");
    } else {
        let name_width = visible
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        for counter in visible {
            out.push_str(&format!(
                "{:<name_width$}  {:>6}  {}\n",
                counter.name, counter.count, counter.id
            ));
        }
    }
    out.push_str(&format!("Showing {} of {}\n", visible.len(), collection_len));
    out.push_str(&format!("Total: {total}\n"));
    out
}
