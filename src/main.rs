use std::io::{self, BufRead};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use estate_session::config::{ClientConfig, ConfigError};
use estate_session::error::AuthError;
use estate_session::identity::{CredentialRelay, IdentityConfig, IdentityError, IdentityProvider};
use estate_session::{
    AuthClient, FileStorage, PropertyClient, PropertyDraft, PropertyFilter, Registration, Role, RouteGuard, Session,
    TokenStore,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),
    #[error("missing Google client id; pass --google-client-id or set ESTATE_GOOGLE_CLIENT_ID")]
    MissingClientId,
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),
    #[error("identity provider produced no credential")]
    NoCredential,
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "estate", about = "Prime Properties session and listing CLI")]
struct Cli {
    #[arg(long, env = "ESTATE_API_URL", default_value = "http://127.0.0.1:8080")]
    api_url: String,

    #[arg(long, help = "Session file path (overrides ESTATE_STORE_PATH)")]
    store: Option<std::path::PathBuf>,

    #[arg(long, env = "ESTATE_GOOGLE_CLIENT_ID")]
    google_client_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with username and password.
    Login {
        username: String,
        #[arg(long, help = "Password, or read one line from stdin when omitted")]
        password: Option<String>,
    },
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Exchange a Google ID token for a session.
    Google { credential: String },
    /// Revalidate the stored session and print it.
    Whoami,
    /// Forget the stored session.
    Logout,
    /// Print the navigation decision for a protected view.
    Guard {
        #[arg(long, help = "CUSTOMER or DEVELOPER; omit for any signed-in user")]
        role: Option<Role>,
    },
    Properties(PropertiesCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "CUSTOMER")]
    role: Role,
    #[arg(long, help = "Password, or read one line from stdin when omitted")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct PropertiesCommand {
    #[command(subcommand)]
    command: PropertiesSubcommand,
}

#[derive(Subcommand, Debug)]
enum PropertiesSubcommand {
    List(FilterArgs),
    /// Listings owned by the signed-in developer.
    Mine,
    Show {
        id: u64,
    },
    Create(DraftArgs),
    Update {
        id: u64,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete {
        id: u64,
    },
    Sold {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, help = "Match title, description or location")]
    search: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    location: String,
    #[arg(long = "type")]
    property_type: String,
    #[arg(long)]
    bedrooms: u32,
    #[arg(long)]
    bathrooms: u32,
    #[arg(long)]
    area: f64,
}

impl From<DraftArgs> for PropertyDraft {
    fn from(args: DraftArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            price: args.price,
            location: args.location,
            property_type: args.property_type,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            area: args.area,
        }
    }
}

impl From<FilterArgs> for PropertyFilter {
    fn from(args: FilterArgs) -> Self {
        Self { search: args.search, location: args.location, min_price: args.min_price, max_price: args.max_price }
    }
}

struct CliContext {
    config: ClientConfig,
    store: TokenStore,
}

impl CliContext {
    fn session(&self) -> Result<Session, CliError> {
        let api = AuthClient::new(self.config.clone(), self.store.clone())?;
        Ok(Session::new(Arc::new(api), self.store.clone()))
    }

    fn properties(&self) -> Result<PropertyClient, CliError> {
        Ok(PropertyClient::new(self.config.clone(), self.store.clone())?)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(&cli.api_url)?.with_env_overrides();
    if let Some(path) = cli.store {
        config = config.with_store_path(path);
    }
    if cli.google_client_id.is_some() {
        config.google_client_id = cli.google_client_id;
    }
    let store = TokenStore::new(Arc::new(FileStorage::new(config.store_path.clone())));
    let ctx = CliContext { config, store };

    match cli.command {
        Command::Login { username, password } => {
            let password = password_or_stdin(password)?;
            let session = ctx.session()?;
            session.login(&username, &password).await?;
            print_json(&session.state())
        }
        Command::Register(args) => {
            let registration = Registration {
                username: args.username,
                name: args.name,
                email: args.email,
                password: password_or_stdin(args.password)?,
                role: args.role,
            };
            let session = ctx.session()?;
            session.register(&registration).await?;
            print_json(&session.state())
        }
        Command::Google { credential } => run_google(&ctx, &credential).await,
        Command::Whoami => {
            let session = ctx.session()?;
            session.init().await;
            print_json(&session.state())
        }
        Command::Logout => {
            let session = ctx.session()?;
            session.logout();
            print_json(&session.state())
        }
        Command::Guard { role } => {
            let session = ctx.session()?;
            let mut rx = session.subscribe();
            session.init().await;
            let guard = role.map_or_else(RouteGuard::authenticated, RouteGuard::require);
            print_json(&guard.resolve(&mut rx).await)
        }
        Command::Properties(properties) => run_properties(&ctx, properties).await,
    }
}

async fn run_google(ctx: &CliContext, credential: &str) -> Result<(), CliError> {
    let identity = IdentityConfig::from_client_config(&ctx.config).ok_or(CliError::MissingClientId)?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut relay = CredentialRelay::new();
    relay.initialize(identity)?;
    relay.on_credential(Box::new(move |credential| {
        if tx.send(credential).is_err() {
            tracing::warn!("credential receiver dropped before delivery");
        }
    }));
    relay.deliver(credential)?;
    drop(relay);

    let credential = rx.recv().await.ok_or(CliError::NoCredential)?;
    let session = ctx.session()?;
    session.google_login(&credential).await?;
    print_json(&session.state())
}

async fn run_properties(ctx: &CliContext, properties: PropertiesCommand) -> Result<(), CliError> {
    let client = ctx.properties()?;
    match properties.command {
        PropertiesSubcommand::List(filter) => {
            let all = client.list().await?;
            let filter = PropertyFilter::from(filter);
            print_json(&filter.apply(&all))
        }
        PropertiesSubcommand::Mine => print_json(&client.mine().await?),
        PropertiesSubcommand::Show { id } => print_json(&client.get(id).await?),
        PropertiesSubcommand::Create(draft) => print_json(&client.create(&draft.into()).await?),
        PropertiesSubcommand::Update { id, draft } => print_json(&client.update(id, &draft.into()).await?),
        PropertiesSubcommand::Delete { id } => {
            client.delete(id).await?;
            eprintln!("deleted property {id}");
            Ok(())
        }
        PropertiesSubcommand::Sold { id } => print_json(&client.mark_sold(id).await?),
    }
}

fn password_or_stdin(password: Option<String>) -> Result<String, CliError> {
    if let Some(password) = password {
        return Ok(password);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
