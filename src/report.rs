use crate::lead::Lead;

const RULE_WIDTH: usize = 60;
const TEXT_WIDTH: usize = 80;
const INDENT: &str = "   ";

/// Render the find-mode lead list for manual review.
pub fn render_leads(leads: &[Lead], total_found: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let options = textwrap::Options::new(TEXT_WIDTH)
        .initial_indent(INDENT)
        .subsequent_indent(INDENT);

    let mut lines = vec![
        rule.clone(),
        format!("FOUND {} POTENTIAL LEADS", total_found),
        rule.clone(),
    ];

    for (rank, lead) in leads.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!(
            "{}. @{} ({} followers)",
            rank + 1,
            lead.handle(),
            group_thousands(lead.followers)
        ));
        lines.push(textwrap::fill(&lead.snippet(), &options));
        if let Some(url) = &lead.url {
            lines.push(format!("{}{}", INDENT, url));
        }
    }

    lines.push(String::new());
    lines.push(rule.clone());
    lines.push("Review these manually and reply to the best ones!".to_string());
    lines.push(rule);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
