use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use wms_ingest::config::{Settings, DB_PATH_ENV, OWNER_ID_ENV};
use wms_ingest::domain::entities::edit::StagedEdits;
use wms_ingest::domain::entities::record::{
    CanonicalField, FieldValue, RecordId, StoredRecord,
};
use wms_ingest::domain::entities::session::Session;
use wms_ingest::domain::entities::sheet::CellValue;
use wms_ingest::domain::mapping::resolve_field_name;
use wms_ingest::domain::projector::parse_quantity;
use wms_ingest::domain::validation::UploadFlow;
use wms_ingest::infra::sqlite::repo::SqliteRepo;
use wms_ingest::usecase::ports::repo::{DuplicatePolicy, RecordRepository};
use wms_ingest::usecase::services::import_service::{read_sheet, ImportService};
use wms_ingest::usecase::services::label_service::{
    labels_from_records, labels_from_sheet, preview_cards, write_label_document,
};
use wms_ingest::usecase::services::record_service::RecordService;

#[derive(Parser)]
#[command(name = "wms-ingest")]
#[command(about = "Inventory spreadsheet upload and shipping label printing", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// Owner identifier stamped on and used to scope records
    #[arg(long, global = true, env = OWNER_ID_ENV)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FlowArg {
    /// Drop rows without a numeric quantity
    Dashboard,
    /// Keep every row
    Inventory,
}

impl From<FlowArg> for UploadFlow {
    fn from(value: FlowArg) -> Self {
        match value {
            FlowArg::Dashboard => UploadFlow::Dashboard,
            FlowArg::Inventory => UploadFlow::Inventory,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the first sheet of a spreadsheet
    Upload {
        /// .xlsx, .xls, .ods or .csv file
        path: PathBuf,
        #[arg(long, value_enum, default_value = "dashboard")]
        flow: FlowArg,
        /// Store the rows again even if this file was already uploaded
        #[arg(long)]
        allow_duplicates: bool,
    },

    /// List stored records
    List,

    /// Show one record
    Show { id: i64 },

    /// Edit fields of a record (replaces the stored record)
    Update {
        id: i64,
        /// field=value, by store column name or header spelling
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Field to remove
        #[arg(long = "clear", value_name = "FIELD")]
        clear: Vec<String>,
    },

    /// Delete a record
    Delete { id: i64 },

    /// List previous uploads
    Uploads,

    /// Render shipping labels
    Labels {
        /// Read rows from this spreadsheet instead of stored records
        #[arg(long)]
        from: Option<PathBuf>,
        /// Directory for the label document
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Print text cards instead of writing the document
        #[arg(long)]
        cards: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.db, cli.owner)?;
    let repo: Arc<dyn RecordRepository> = Arc::new(SqliteRepo::new(settings.db_path.clone()));
    repo.init()?;

    match cli.command {
        Commands::Upload {
            path,
            flow,
            allow_duplicates,
        } => cmd_upload(&settings, repo, path, flow.into(), allow_duplicates),
        Commands::List => cmd_list(&settings, repo),
        Commands::Show { id } => cmd_show(&settings, repo, id),
        Commands::Update { id, set, clear } => cmd_update(&settings, repo, id, &set, &clear),
        Commands::Delete { id } => cmd_delete(&settings, repo, id),
        Commands::Uploads => cmd_uploads(&settings, repo),
        Commands::Labels { from, out, cards } => cmd_labels(&settings, repo, from, out, cards),
    }
}

fn session(settings: &Settings) -> Result<Session> {
    let owner = settings
        .owner_id
        .clone()
        .ok_or_else(|| anyhow!("--owner or {OWNER_ID_ENV} is required"))?;
    Ok(Session::new(owner)?)
}

fn cmd_upload(
    settings: &Settings,
    repo: Arc<dyn RecordRepository>,
    path: PathBuf,
    flow: UploadFlow,
    allow_duplicates: bool,
) -> Result<()> {
    let session = session(settings)?;
    let duplicates = if allow_duplicates {
        DuplicatePolicy::Allow
    } else {
        DuplicatePolicy::Reject
    };

    let summary = ImportService::new(repo)
        .upload_file(&session, &path, flow, duplicates)
        .with_context(|| format!("upload failed: {}", path.display()))?;

    println!(
        "Upload #{}: {} of {} rows stored",
        summary.upload_id.0,
        summary.inserted(),
        summary.source_rows
    );
    if summary.dropped_rows > 0 {
        println!("  {} rows without a numeric quantity skipped", summary.dropped_rows);
    }
    if !summary.unmapped_headers.is_empty() {
        println!("  ignored columns: {}", summary.unmapped_headers.join(", "));
    }
    Ok(())
}

fn print_record(stored: &StoredRecord) {
    println!(
        "#{} (upload {}, {})",
        stored.id.0,
        stored
            .upload_id
            .map(|id| id.0.to_string())
            .unwrap_or_else(|| "-".to_string()),
        stored.created_at
    );
    for (field, value) in stored.record.fields() {
        println!("  {:<18}{}", field.stored_name(), value.display());
    }
}

fn cmd_list(settings: &Settings, repo: Arc<dyn RecordRepository>) -> Result<()> {
    let session = session(settings)?;
    let records = RecordService::new(repo).list(&session)?;
    if records.is_empty() {
        println!("No records.");
        return Ok(());
    }
    for stored in &records {
        print_record(stored);
    }
    println!("{} records", records.len());
    Ok(())
}

fn cmd_show(settings: &Settings, repo: Arc<dyn RecordRepository>, id: i64) -> Result<()> {
    let session = session(settings)?;
    let stored = RecordService::new(repo).get(&session, RecordId(id))?;
    print_record(&stored);
    Ok(())
}

fn parse_field(name: &str) -> Result<CanonicalField> {
    resolve_field_name(name.trim()).ok_or_else(|| anyhow!("unknown field: {name}"))
}

fn parse_edits(set: &[String], clear: &[String]) -> Result<StagedEdits> {
    let mut edits = StagedEdits::default();
    for assignment in set {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got: {assignment}"))?;
        let field = parse_field(name)?;
        let value = match field {
            CanonicalField::Quantity => {
                FieldValue::Number(parse_quantity(&CellValue::Text(raw.to_string())))
            }
            _ => FieldValue::Text(raw.to_string()),
        };
        edits.set_fields.insert(field, value);
    }
    for name in clear {
        edits.cleared_fields.insert(parse_field(name)?);
    }
    Ok(edits)
}

fn cmd_update(
    settings: &Settings,
    repo: Arc<dyn RecordRepository>,
    id: i64,
    set: &[String],
    clear: &[String],
) -> Result<()> {
    let session = session(settings)?;
    let edits = parse_edits(set, clear)?;
    if edits.is_empty() {
        anyhow::bail!("nothing to update: pass --set or --clear");
    }
    let stored = RecordService::new(repo).apply_edits(&session, RecordId(id), &edits)?;
    print_record(&stored);
    Ok(())
}

fn cmd_delete(settings: &Settings, repo: Arc<dyn RecordRepository>, id: i64) -> Result<()> {
    let session = session(settings)?;
    RecordService::new(repo).delete(&session, RecordId(id))?;
    println!("Deleted record #{id}");
    Ok(())
}

fn cmd_uploads(settings: &Settings, repo: Arc<dyn RecordRepository>) -> Result<()> {
    let session = session(settings)?;
    let uploads = RecordService::new(repo).list_uploads(&session)?;
    if uploads.is_empty() {
        println!("No uploads.");
        return Ok(());
    }
    for upload in uploads {
        println!(
            "#{}  {}  {} rows  {}  {}",
            upload.id.0,
            upload.created_at,
            upload.row_count,
            &upload.token[..12.min(upload.token.len())],
            upload.source_path
        );
    }
    Ok(())
}

fn cmd_labels(
    settings: &Settings,
    repo: Arc<dyn RecordRepository>,
    from: Option<PathBuf>,
    out: PathBuf,
    cards: bool,
) -> Result<()> {
    let labels = match from {
        Some(path) => labels_from_sheet(&read_sheet(&path)?),
        None => {
            let session = session(settings)?;
            labels_from_records(&RecordService::new(repo).list(&session)?)
        }
    };
    if labels.is_empty() {
        anyhow::bail!("no rows to print");
    }

    if cards {
        for card in preview_cards(&labels) {
            println!("{card}");
        }
        return Ok(());
    }

    let document = write_label_document(&labels, &out)?;
    println!(
        "Wrote {} labels to {}",
        document.pages,
        document.path.display()
    );
    Ok(())
}
