use crate::convert::DocumentEditBuilder;
use crate::google::docs::{DocsClient, Document, Tab};
use crate::google::BatchRequestSink;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub title: String,
    pub tab_id: String,
    pub level: usize,
    pub children: Vec<TabInfo>,
}

/// Mirrors the document's tab tree. Tabs without properties are left out.
pub fn tab_tree(tabs: &[Tab], level: usize) -> Vec<TabInfo> {
    tabs.iter()
        .filter_map(|tab| {
            let properties = tab.tab_properties.as_ref()?;
            Some(TabInfo {
                title: properties.title.clone(),
                tab_id: properties.tab_id.clone(),
                level,
                children: tab_tree(&tab.child_tabs, level + 1),
            })
        })
        .collect()
}

/// One `title (id)` line per tab, indented with a tab character per level.
pub fn format_tabs(tabs: &[TabInfo]) -> String {
    fn write(tabs: &[TabInfo], out: &mut String) {
        for tab in tabs {
            out.push_str(&"\t".repeat(tab.level));
            out.push_str(&format!("{} ({})\n", tab.title, tab.tab_id));
            write(&tab.children, out);
        }
    }

    let mut out = String::from("Tabs:\n");
    if tabs.is_empty() {
        out.push_str("No tabs found.\n");
    } else {
        write(tabs, &mut out);
    }
    out
}

pub async fn list_tabs(docs: &DocsClient, document_id: &str) -> Result<Vec<TabInfo>> {
    let document = docs.get(document_id, true).await?;
    Ok(tab_tree(&document.tabs, 0))
}

/// Creates an empty document and fills it in a single batch update.
pub async fn create_from_markdown(docs: &DocsClient, title: &str, markdown: &str) -> Result<Document> {
    let document = docs.create(title).await?;
    let edits = DocumentEditBuilder::new().build(markdown);
    docs.submit(&document.document_id, &edits.edits).await?;
    Ok(document)
}
