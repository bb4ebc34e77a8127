//! Calls the real Google APIs. Run with `--ignored` and GOOGLE_ACCESS_TOKEN
//! (plus TEST_SPREADSHEET_ID for the Sheets test) set in the environment or `.env`.

use std::env;

use dotenv::dotenv;

use crate::{
    client::Workspace,
    logging::init_logging,
    workspace::{drive, sheets},
};

fn live_workspace() -> anyhow::Result<Workspace> {
    dotenv().ok();
    let access_token = env::var("GOOGLE_ACCESS_TOKEN")?;
    Ok(Workspace::from_access_token(&access_token)?)
}

#[tokio::test]
#[ignore]
async fn test_list_spreadsheets() -> anyhow::Result<()> {
    init_logging("debug");
    let workspace = live_workspace()?;

    let files = drive::list_files(
        &workspace.drive,
        10,
        "mimeType='application/vnd.google-apps.spreadsheet'",
    )
    .await?;
    println!("{}", drive::format_file_list(&files));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_read_first_sheet() -> anyhow::Result<()> {
    let workspace = live_workspace()?;
    let spreadsheet_id = env::var("TEST_SPREADSHEET_ID")?;

    let names = sheets::list_sheets(&workspace.sheets, &spreadsheet_id).await?;
    let Some(first) = names.first() else {
        anyhow::bail!("spreadsheet {spreadsheet_id} has no sheets");
    };

    let rows = sheets::get_range(&workspace.sheets, &spreadsheet_id, first, Some("A1:C5")).await?;
    println!("{}", sheets::to_tsv(&rows));

    Ok(())
}
