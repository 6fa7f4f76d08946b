//! MediTrack command-line front end.
//!
//! Renders the role dashboards as text.
//!
//! Usage:
//!   meditrack login --email <email> --password <password>
//!   meditrack signup --name <name> --email <email> --password <password> --role <role>
//!   meditrack doctor submit --patient <name> --medicine "Ibuprofen|200mg|after food"
//!   meditrack patient --search <query>
//!   meditrack pharmacy add --name <name> --manufacturer <m> --price <p> --quantity <q>

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use meditrack_client::{
    ApiClient, ClientConfig, ClientError, DoctorDashboard, PatientDashboard, PharmacyDashboard,
    Route, ScopeHandle, Session, SignupRequest,
};
use meditrack_core::{Attachment, Identity, LineField, MedicineForm, Prescription, Role};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meditrack")]
#[command(author = "MediTrack Team")]
#[command(version)]
#[command(about = "Prescriptions, stock and inventory for doctors, patients and pharmacies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides MEDITRACK_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Session database (overrides MEDITRACK_SESSION_DB)
    #[arg(long)]
    session_db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// doctor, patient or pharmacy
        #[arg(short, long)]
        role: Role,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Doctor dashboard
    Doctor {
        #[command(subcommand)]
        command: DoctorCommands,
    },

    /// Patient dashboard: own prescriptions with stock availability
    Patient {
        /// Filter by doctor, medicine or date
        #[arg(short, long, default_value = "")]
        search: String,

        /// Also list other patients' prescriptions
        #[arg(long)]
        all: bool,
    },

    /// Pharmacy dashboard
    Pharmacy {
        #[command(subcommand)]
        command: PharmacyCommands,
    },
}

#[derive(Subcommand)]
enum DoctorCommands {
    /// List prescriptions you have issued
    List {
        /// Filter by patient name or date
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Write a prescription
    Submit {
        #[arg(long)]
        patient: String,

        /// Medicine as "name|dosage|instructions" (repeatable)
        #[arg(short, long = "medicine")]
        medicines: Vec<String>,

        /// Attach a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PharmacyCommands {
    /// List inventory
    Medicines {
        /// Filter by medicine name
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Add a medicine to the inventory
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        manufacturer: String,

        #[arg(long)]
        price: String,

        #[arg(long)]
        quantity: String,
    },

    /// Remove a medicine by ID
    Delete { id: String },

    /// Cross-reference prescriptions against stock
    Prescriptions {
        /// Filter by patient, doctor or medicine
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meditrack=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<ClientError>() {
            Some(ClientError::Cancelled) => eprintln!("Cancelled"),
            Some(client_err) => eprintln!("{}", client_err.user_message()),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    if let Some(path) = cli.session_db {
        config.session_db = path;
    }

    let api = ApiClient::new(&config)?;
    let mut session = Session::open(&config)
        .with_context(|| format!("opening session store {}", config.session_db.display()))?;

    match cli.command {
        Commands::Login { email, password } => {
            let identity = session.login(&api, &email, &password).await?;
            println!("Logged in as {} ({})", identity.name, identity.role);
            println!("Dashboard: {}", Route::for_identity(Some(identity)));
        }
        Commands::Signup {
            name,
            email,
            password,
            role,
        } => {
            let request = SignupRequest {
                name,
                email,
                password,
                role,
            };
            println!("{}", session.signup(&api, &request).await?);
        }
        Commands::Logout => {
            if session.logout()? {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Commands::Whoami => match session.identity() {
            Some(identity) => println!("{} ({}) {}", identity.name, identity.role, identity.id),
            None => println!("Not logged in"),
        },
        Commands::Doctor { command } => {
            let identity = require(&session, Route::Doctor)?;
            let mut view = DoctorDashboard::new(api, Some(identity), config.timestamps.clone());
            cancel_on_ctrl_c(view.scope_handle());
            doctor(&mut view, command).await?;
        }
        Commands::Patient { search, all } => {
            let identity = require(&session, Route::Patient)?;
            let mut view = PatientDashboard::new(api, Some(identity), config.timestamps.clone());
            cancel_on_ctrl_c(view.scope_handle());
            view.load().await?;
            view.set_query(search);
            patient(&view, all);
        }
        Commands::Pharmacy { command } => {
            let identity = require(&session, Route::Pharmacy)?;
            let mut view = PharmacyDashboard::new(api, Some(identity), config.timestamps.clone());
            cancel_on_ctrl_c(view.scope_handle());
            pharmacy(&mut view, command).await?;
        }
    }
    Ok(())
}

/// Identity for a dashboard route, or an error naming the missing role.
fn require(session: &Session, route: Route) -> anyhow::Result<Identity> {
    match session.identity() {
        Some(identity) if session.route() == route => Ok(identity.clone()),
        Some(identity) => bail!(
            "Logged in as {}, not {}",
            identity.role,
            route.path().trim_start_matches('/')
        ),
        None => bail!("Not logged in. Run `meditrack login` first."),
    }
}

fn cancel_on_ctrl_c(handle: ScopeHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, cancelling pending requests");
            handle.cancel();
        }
    });
}

async fn doctor(view: &mut DoctorDashboard, command: DoctorCommands) -> anyhow::Result<()> {
    match command {
        DoctorCommands::List { search } => {
            view.refresh().await?;
            let matches = view.search(&search);
            if matches.is_empty() {
                println!("No prescriptions found");
            }
            for p in matches {
                print_prescription(p, &view.format_created(p));
            }
        }
        DoctorCommands::Submit {
            patient,
            medicines,
            file,
        } => {
            let draft = view.draft_mut();
            draft.set_patient_name(patient);
            for (index, entry) in medicines.iter().enumerate() {
                if index > 0 {
                    draft.add_line();
                }
                let mut parts = entry.splitn(3, '|').map(str::trim);
                for field in [LineField::Name, LineField::Dosage, LineField::Instructions] {
                    if let Some(value) = parts.next() {
                        draft.set_field(index, field, value);
                    }
                }
            }
            if let Some(path) = file {
                draft.attach(read_attachment(&path).await?);
            }

            let id = view.submit().await?;
            println!("Prescription uploaded successfully ({})", id);
        }
    }
    Ok(())
}

fn patient(view: &PatientDashboard, all: bool) {
    let mine = view.mine();
    if mine.is_empty() {
        println!("No prescriptions found");
    }
    for p in mine {
        println!("{}  Dr. {}", view.format_created(p), p.doctor_name);
        for line in &p.medicines {
            println!(
                "    {} {} ({}) - {}",
                line.name,
                line.dosage,
                line.instructions,
                view.stock_label(&line.name)
            );
        }
    }

    if all {
        println!();
        println!("Other prescriptions: {}", view.others().len());
        for p in view.others() {
            print_prescription(p, &view.format_created(p));
        }
    }
}

async fn pharmacy(view: &mut PharmacyDashboard, command: PharmacyCommands) -> anyhow::Result<()> {
    match command {
        PharmacyCommands::Medicines { search } => {
            view.reload_medicines().await?;
            view.set_medicine_query(search);
            for m in view.filtered_medicines() {
                println!(
                    "{}  {}  {}  {:.2}  {}",
                    m.id,
                    m.name,
                    m.manufacturer,
                    m.price,
                    view.stock_label(&m.name)
                );
            }
        }
        PharmacyCommands::Add {
            name,
            manufacturer,
            price,
            quantity,
        } => {
            *view.form_mut() = MedicineForm::new(name, manufacturer, price, quantity);
            view.add_medicine().await?;
            println!("Medicine added. Inventory now holds {} records", view.medicines().len());
        }
        PharmacyCommands::Delete { id } => {
            view.delete_medicine(&id).await?;
            println!("Deleted. Inventory now holds {} records", view.medicines().len());
        }
        PharmacyCommands::Prescriptions { search } => {
            view.load().await?;
            view.set_prescription_query(search);
            for p in view.filtered_prescriptions() {
                println!("{}  Dr. {}", p.patient_name, p.doctor_name);
                for line in &p.medicines {
                    println!("    {} {} - {}", line.name, line.dosage, view.stock_label(&line.name));
                }
            }
        }
    }
    Ok(())
}

fn print_prescription(p: &Prescription, created: &str) {
    let medicines: Vec<&str> = p.medicine_names().collect();
    println!("{}  {}  [{}]", created, p.patient_name, medicines.join(", "));
}

async fn read_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => Some("application/pdf"),
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        _ => None,
    };
    Ok(Attachment {
        file_name,
        content_type: content_type.map(str::to_string),
        bytes,
    })
}
