//! Human-readable notification text for new expenses

use crate::core::Expense;

/// Render one notification block
///
/// Layout, one line each: the description, the amount, one line per
/// participant in upstream order, then a link to the dashboard.
pub fn format_expense(expense: &Expense, dashboard_url: &str) -> String {
    let currency = &expense.currency_code;
    let mut lines = Vec::with_capacity(expense.users.len() + 3);

    lines.push(format!("New expense: {}", expense.description));
    lines.push(format!("Amount: {} {}", expense.cost, currency));

    for share in &expense.users {
        lines.push(format!(
            "{} (paid: {} {}, owed: {} {})",
            share.user.full_name(),
            share.paid_share,
            currency,
            share.owed_share,
            currency
        ));
    }

    lines.push(format!("View details: {}", dashboard_url));
    lines.join("\n")
}

/// Stack blocks into the single message sent per sync
pub fn join_blocks(blocks: &[String]) -> String {
    blocks.join("\n")
}
