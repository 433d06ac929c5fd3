//! Parser for the public bot listing page.
//!
//! The page is a bordered table with one bot per row; the account id is the
//! second cell. Anything else is a malformed response, never an empty list.

use scraper::{Html, Selector};

use crate::domain::Registry;
use crate::error::{GuardError, Result};

const TABLE_SELECTOR: &str = "table.table.table-bordered";
const ROW_SELECTOR: &str = "table.table.table-bordered tbody > tr";
const IDENTITY_COLUMN: usize = 1;

fn selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| GuardError::Internal(format!("bad selector {}: {:?}", raw, e)))
}

pub fn parse_bot_table(html: &str) -> Result<Registry> {
    let document = Html::parse_document(html);

    if document.select(&selector(TABLE_SELECTOR)?).next().is_none() {
        return Err(GuardError::MalformedResponse(
            "bot table not found on registry page".to_string(),
        ));
    }

    let cell = selector("td")?;
    let mut registry = Registry::new();

    for (index, row) in document.select(&selector(ROW_SELECTOR)?).enumerate() {
        let identity = row
            .select(&cell)
            .nth(IDENTITY_COLUMN)
            .map(|td| td.text().collect::<String>())
            .ok_or_else(|| {
                GuardError::MalformedResponse(format!("row {} has no identity column", index + 1))
            })?;

        let identity = identity.trim();
        if identity.is_empty() {
            return Err(GuardError::MalformedResponse(format!(
                "row {} has an empty identity",
                index + 1
            )));
        }
        registry.insert(identity);
    }

    if registry.is_empty() {
        return Err(GuardError::MalformedResponse(
            "bot table has no rows".to_string(),
        ));
    }

    Ok(registry)
}
