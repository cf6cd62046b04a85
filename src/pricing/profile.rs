// Fund profile page scraper
//
// The profile page is a label/value table: a header or data cell holding
// the label, immediately followed by the cell holding the value.

use scraper::{Html, Selector};

use crate::db::FundProfile;

const MANAGER_LABELS: &[&str] = &["基金经理"];
const COMPANY_LABELS: &[&str] = &["基金管理人"];
const SCALE_LABELS: &[&str] = &["基金规模", "资产规模"];
const ESTABLISH_LABELS: &[&str] = &["成立日期"];

/// Extract manager, company, size and inception date. Missing fields stay `-`.
pub fn parse_fund_profile(html: &str) -> FundProfile {
    let document = Html::parse_document(html);
    let cells: Vec<String> = match Selector::parse("th, td") {
        Ok(selector) => document
            .select(&selector)
            .map(|cell| normalize_text(&cell.text().collect::<String>()))
            .collect(),
        Err(_) => return FundProfile::default(),
    };

    let mut profile = FundProfile::default();
    if let Some(v) = value_after_label(&cells, MANAGER_LABELS) {
        profile.manager = v;
    }
    if let Some(v) = value_after_label(&cells, COMPANY_LABELS) {
        profile.company = v;
    }
    if let Some(v) = value_after_label(&cells, SCALE_LABELS) {
        profile.scale = v;
    }
    if let Some(v) = value_after_label(&cells, ESTABLISH_LABELS) {
        profile.establish_date = v;
    }
    profile
}

fn value_after_label(cells: &[String], labels: &[&str]) -> Option<String> {
    cells.windows(2).find_map(|pair| {
        let is_label = labels.iter().any(|label| pair[0].contains(label));
        if is_label && !pair[1].is_empty() {
            Some(pair[1].clone())
        } else {
            None
        }
    })
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
