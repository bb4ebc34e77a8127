use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use async_mcp::transport::ServerStdioTransport;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;

use drivectl::{
    config::{GlobalArgs, Settings},
    convert::{presentation::TITLE_AND_BODY, ImagePlacement},
    logging::init_logging,
    workspace::{docs, drive, is_printable_format, sheets, slides},
    http_port, serve_http, Workspace, WorkspaceServer,
};

#[derive(Parser)]
#[command(author, version, about = "Google Drive, Docs, Sheets and Slides from the command line", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Serve every command as an MCP tool over stdio
    #[arg(long)]
    mcp: bool,

    /// Serve every command as an MCP tool over HTTP (SSE and WebSocket) on
    /// [host]:port. The listener binds all interfaces on that port.
    #[arg(long, value_name = "ADDR", conflicts_with = "mcp")]
    http: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the OAuth flow and cache the token
    Auth,
    /// List files in Google Drive
    List {
        #[arg(long, default_value_t = 100)]
        limit: i32,
        /// Drive query, e.g. "name contains 'notes'"
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Download or export a file
    Get {
        file_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export format for Google files (pdf, docx, txt, md, csv, ...)
        #[arg(long)]
        format: Option<String>,
        /// Render a single document tab as text
        #[arg(long)]
        tab_id: Option<String>,
    },
    /// Show file metadata as JSON
    Describe { file_id: String },
    /// Google Docs commands
    Docs {
        #[command(subcommand)]
        command: DocsCommands,
    },
    /// Google Sheets commands
    Sheets {
        #[command(subcommand)]
        command: SheetsCommands,
    },
    /// Google Slides commands
    Slides {
        #[command(subcommand)]
        command: SlidesCommands,
    },
}

#[derive(Subcommand)]
enum DocsCommands {
    /// List the tabs of a document
    Tabs { document_id: String },
    /// Create a document from a Markdown file
    Create { title: String, markdown_file: PathBuf },
}

#[derive(Subcommand)]
enum SheetsCommands {
    /// List the sheets of a spreadsheet
    List { spreadsheet_id: String },
    /// Get a sheet as CSV
    Get {
        spreadsheet_id: String,
        #[arg(long)]
        sheet: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a range as tab-separated values
    GetRange {
        spreadsheet_id: String,
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        range: String,
    },
    /// Write a value, or a JSON array of rows, to a range
    UpdateRange {
        spreadsheet_id: String,
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        range: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum SlidesCommands {
    /// Print the text of a presentation, export it, or save slide thumbnails
    Get {
        presentation_id: String,
        /// pdf, pptx, txt, ... or png/jpg for one thumbnail per slide
        #[arg(long)]
        format: Option<String>,
        /// Output file, or directory for thumbnails
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print speaker notes
    Notes {
        presentation_id: String,
        /// 1-based slide number, 0 for all slides
        #[arg(long, default_value_t = 0)]
        slide_number: usize,
        #[arg(long, default_value = "txt")]
        format: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create an empty presentation
    Create { title: String },
    /// Create a presentation from a Markdown or legacy slide file
    CreateFrom {
        file: PathBuf,
        /// markdown or slides; inferred from the extension when omitted
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Add a slide
    Add {
        presentation_id: String,
        #[arg(long, default_value = TITLE_AND_BODY)]
        layout: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Place an image from a public URL on a slide
    AddImage {
        presentation_id: String,
        image_url: String,
        /// Defaults to the first slide
        #[arg(long)]
        slide_id: Option<String>,
        #[arg(long, default_value_t = 50.0)]
        left: f64,
        #[arg(long, default_value_t = 50.0)]
        top: f64,
        #[arg(long, default_value_t = 0.0)]
        width: f64,
        #[arg(long, default_value_t = 0.0)]
        height: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.global.log_level);

    let settings = Settings::resolve(&cli.global)?;

    if cli.mcp {
        let server = WorkspaceServer::new(settings.non_interactive().token_source())
            .build(ServerStdioTransport)?;
        let server_handle = tokio::spawn(async move { server.listen().await });

        server_handle
            .await?
            .map_err(|e| anyhow!("MCP server error: {:#?}", e))?;
        return Ok(());
    }

    if let Some(addr) = &cli.http {
        let port = http_port(addr)?;
        serve_http(settings.non_interactive().token_source(), port).await?;
        return Ok(());
    }

    let Some(command) = cli.command else {
        bail!("no command given, run with --help for usage");
    };

    match command {
        Commands::Auth => {
            settings.auth_provider().authorize().await?;
            println!(
                "Authorization successful. Token saved to {}",
                settings.token_cache.display()
            );
        }
        Commands::List { limit, query } => {
            let workspace = connect(&settings).await?;
            let files =
                drive::list_files(&workspace.drive, limit, query.as_deref().unwrap_or_default()).await?;
            print!("{}", drive::format_file_list(&files));
        }
        Commands::Get {
            file_id,
            output,
            format,
            tab_id,
        } => {
            let workspace = connect(&settings).await?;
            let content =
                drive::get_file(&workspace, &file_id, format.as_deref(), tab_id.as_deref()).await?;
            write_output(&content, output.as_deref(), format.as_deref()).await?;
        }
        Commands::Describe { file_id } => {
            let workspace = connect(&settings).await?;
            let file = drive::describe_file(&workspace.drive, &file_id).await?;
            println!("{}", serde_json::to_string_pretty(&file)?);
        }
        Commands::Docs { command } => run_docs(&connect(&settings).await?, command).await?,
        Commands::Sheets { command } => run_sheets(&connect(&settings).await?, command).await?,
        Commands::Slides { command } => run_slides(&connect(&settings).await?, command).await?,
    }

    Ok(())
}

async fn connect(settings: &Settings) -> Result<Workspace> {
    Workspace::connect(settings.token_source().as_ref())
        .await
        .context("unable to connect to Google Workspace")
}

async fn run_docs(workspace: &Workspace, command: DocsCommands) -> Result<()> {
    match command {
        DocsCommands::Tabs { document_id } => {
            let tabs = docs::list_tabs(&workspace.docs, &document_id).await?;
            print!("{}", docs::format_tabs(&tabs));
        }
        DocsCommands::Create {
            title,
            markdown_file,
        } => {
            let markdown = tokio::fs::read_to_string(&markdown_file)
                .await
                .with_context(|| format!("unable to read {}", markdown_file.display()))?;
            let document = docs::create_from_markdown(&workspace.docs, &title, &markdown).await?;
            println!(
                "Successfully created document {} ({})",
                document.title, document.document_id
            );
        }
    }
    Ok(())
}

async fn run_sheets(workspace: &Workspace, command: SheetsCommands) -> Result<()> {
    match command {
        SheetsCommands::List { spreadsheet_id } => {
            for name in sheets::list_sheets(&workspace.sheets, &spreadsheet_id).await? {
                println!("{name}");
            }
        }
        SheetsCommands::Get {
            spreadsheet_id,
            sheet,
            output,
        } => {
            let csv = sheets::get_sheet_csv(&workspace.sheets, &spreadsheet_id, &sheet).await?;
            write_output(csv.as_bytes(), output.as_deref(), Some("csv")).await?;
        }
        SheetsCommands::GetRange {
            spreadsheet_id,
            sheet,
            range,
        } => {
            let rows =
                sheets::get_range(&workspace.sheets, &spreadsheet_id, &sheet, Some(&range)).await?;
            print!("{}", sheets::to_tsv(&rows));
        }
        SheetsCommands::UpdateRange {
            spreadsheet_id,
            sheet,
            range,
            value,
        } => {
            sheets::update_range(
                &workspace.sheets,
                &spreadsheet_id,
                &sheet,
                &range,
                sheets::parse_update_values(&value),
            )
            .await?;
            println!("Sheet updated successfully.");
        }
    }
    Ok(())
}

async fn run_slides(workspace: &Workspace, command: SlidesCommands) -> Result<()> {
    match command {
        SlidesCommands::Get {
            presentation_id,
            format,
            output,
        } => match format.as_deref() {
            Some(image @ ("png" | "jpg")) => {
                let dir = output.context("thumbnail export needs an output directory (-o)")?;
                let written =
                    slides::export_thumbnails(&workspace.slides, &presentation_id, &dir, image)
                        .await?;
                info!("Saved {} thumbnails to {}", written.len(), dir.display());
            }
            Some(format) => {
                let mime = drive::validate_format(format)?;
                let content = drive::export_file(&workspace.drive, &presentation_id, mime).await?;
                write_output(&content, output.as_deref(), Some(format)).await?;
            }
            None => {
                let presentation = workspace.slides.get(&presentation_id).await?;
                let text = slides::presentation_text(&presentation);
                write_output(text.as_bytes(), output.as_deref(), None).await?;
            }
        },
        SlidesCommands::Notes {
            presentation_id,
            slide_number,
            format,
            output,
        } => {
            let format = slides::NotesFormat::from_name(&format)?;
            let presentation = workspace.slides.get(&presentation_id).await?;
            let notes = slides::format_notes(&presentation, slide_number, format)?;
            write_output(notes.as_bytes(), output.as_deref(), None).await?;
        }
        SlidesCommands::Create { title } => {
            let presentation = slides::create_presentation(&workspace.slides, &title).await?;
            println!(
                "Successfully created presentation with ID: {}",
                presentation.presentation_id
            );
        }
        SlidesCommands::CreateFrom { file, kind, title } => {
            let kind = match kind.as_deref() {
                Some(kind) => slides::SourceKind::from_name(kind)?,
                None => slides::SourceKind::infer(&file)?,
            };
            let source = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("unable to read {}", file.display()))?;
            let title = title.unwrap_or_else(|| slides::default_title(&file));
            let presentation =
                slides::create_from_source(&workspace.slides, &title, &source, kind).await?;
            println!(
                "Successfully created presentation with ID: {}",
                presentation.presentation_id
            );
        }
        SlidesCommands::Add {
            presentation_id,
            layout,
            title,
        } => {
            let slide_id =
                slides::add_slide(&workspace.slides, &presentation_id, &layout, title.as_deref())
                    .await?;
            println!("Successfully added slide {slide_id}");
        }
        SlidesCommands::AddImage {
            presentation_id,
            image_url,
            slide_id,
            left,
            top,
            width,
            height,
        } => {
            let placement = ImagePlacement {
                left,
                top,
                width,
                height,
            };
            let image_id = slides::add_image(
                &workspace.slides,
                &presentation_id,
                slide_id.as_deref(),
                &image_url,
                placement,
            )
            .await?;
            println!("Successfully added image {image_id}");
        }
    }
    Ok(())
}

/// Writes to `output` when given. Otherwise prints text formats to stdout
/// and refuses to dump binary content on the terminal.
async fn write_output(content: &[u8], output: Option<&Path>, format: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("unable to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", content.len(), path.display());
        }
        None if is_printable_format(format) => {
            print!("{}", String::from_utf8_lossy(content));
        }
        None => {
            println!(
                "Output is binary ({}). Use -o to save it to a file.",
                format.unwrap_or_default()
            );
        }
    }
    Ok(())
}
