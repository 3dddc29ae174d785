use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use estate_admin::cli::{
    Cli, Command, ListPropertiesArgs, LookupCommand, PropertiesCommand, UsersCommand,
};
use estate_admin::format::{format_currency, format_date, truncate_text};
use estate_admin::models::{LookupRecord, NewCity, NewPropertyType};
use estate_admin::store::PropertyDetail;
use estate_admin::{
    init_logging, AdminClient, AuthService, CityDirectory, Config, Directory, FileSessionStore,
    Language, Property, PropertyQuery, PropertyRepository, PropertyStore, PropertyTypeDirectory,
    Rtl, UserStore,
};

const ROW_WIDTH: usize = 72;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("Failed to load configuration")?;
    let language = cli.lang.unwrap_or(config.ui.language);
    debug!("Using backend {} ({})", config.api.base_url, language);

    let client = Arc::new(AdminClient::with_config(&config.api)?);
    let mut auth = AuthService::new(
        client.clone(),
        Arc::new(FileSessionStore::new(config.session_path())),
    );
    auth.restore().await.context("Failed to read saved session")?;

    let out = Output::new(language);

    match cli.command {
        Command::Properties(cmd) => handle_properties(client, &auth, &out, cmd).await,
        Command::Users(cmd) => handle_users(client, &auth, &out, cmd).await,
        Command::Cities(cmd) => {
            let cities = CityDirectory::with_capacity(client, config.cache.capacity);
            handle_lookup(&cities, &auth, &out, cmd, NewCity::new).await
        }
        Command::Types(cmd) => {
            let types = PropertyTypeDirectory::with_capacity(client, config.cache.capacity);
            handle_lookup(&types, &auth, &out, cmd, NewPropertyType::new).await
        }
        Command::Login(args) => {
            let user = auth
                .login(&args.phone, &args.password)
                .await
                .context("Login failed")?;
            println!("Signed in as {} ({})", user.display_name(), user.role);
            Ok(())
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            match auth.session() {
                Some(session) => {
                    out.line(&format!(
                        "{} <{}> role={} since {}",
                        session.user.display_name(),
                        session.user.email,
                        session.user.role,
                        session.logged_in_at.format("%Y-%m-%d %H:%M UTC")
                    ));
                }
                None => println!("Not signed in"),
            }
            Ok(())
        }
    }
}

/// Console rows laid out for the interface language.
struct Output {
    rtl: Rtl,
}

impl Output {
    fn new(language: Language) -> Self {
        Self {
            rtl: Rtl::new(language),
        }
    }

    fn line(&self, text: &str) {
        if self.rtl.is_rtl() {
            println!("{:>width$}", text, width = ROW_WIDTH);
        } else {
            println!("{text}");
        }
    }

    fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn require_login(auth: &AuthService) -> anyhow::Result<()> {
    if !auth.is_authenticated() {
        bail!("Not signed in; run `estate-admin login` first");
    }
    Ok(())
}

async fn handle_properties(
    client: Arc<AdminClient>,
    auth: &AuthService,
    out: &Output,
    cmd: PropertiesCommand,
) -> anyhow::Result<()> {
    let repository = PropertyRepository::new(client);

    match cmd {
        PropertiesCommand::List(args) => list_properties(repository, out, args).await,
        PropertiesCommand::Show { id, json } => {
            let mut detail = PropertyDetail::new(repository);
            detail.fetch(id).await;
            if let Some(message) = detail.error() {
                bail!("{message}");
            }
            let Some(property) = detail.property() else {
                bail!("Property {id} not found");
            };
            if json {
                return out.json(&property.to_json());
            }
            print_property_detail(out, property);
            Ok(())
        }
        PropertiesCommand::Stats => {
            let mut store = PropertyStore::new(repository, PropertyQuery::default());
            store.ensure_fetched().await;
            if let Some(message) = store.error() {
                bail!("{message}");
            }
            let stats = store.statistics();
            let range = store.price_range();
            out.line(&format!("Total:         {}", stats.total));
            out.line(&format!("Available:     {}", stats.available));
            out.line(&format!("Average price: {}", format_currency(stats.average_price)));
            out.line(&format!(
                "Price range:   {} - {}",
                format_currency(range.min),
                format_currency(range.max)
            ));
            for (kind, count) in &stats.property_types {
                out.line(&format!("  {kind}: {count}"));
            }
            Ok(())
        }
        PropertiesCommand::Delete { id } => {
            require_login(auth)?;
            repository.delete_property(id).await?;
            println!("Deleted property {id}");
            Ok(())
        }
    }
}

async fn list_properties(
    repository: PropertyRepository,
    out: &Output,
    args: ListPropertiesArgs,
) -> anyhow::Result<()> {
    let query = PropertyQuery {
        only_available: args.available,
        property_type: args.property_type,
        limit: args.limit,
        sort_by: args.sort,
        sort_order: args.order,
    };
    let mut store = PropertyStore::new(repository, query);
    store.ensure_fetched().await;
    if let Some(message) = store.error() {
        bail!("{message}");
    }

    let listed: Vec<&Property> = match args.search.as_deref() {
        Some(term) => store.search(term),
        None => store.properties().iter().collect(),
    };
    info!("Showing {} of {} properties", listed.len(), store.properties().len());

    if args.json {
        let records: Vec<_> = listed.iter().map(|p| p.to_json()).collect();
        return out.json(&records);
    }

    for (i, property) in listed.iter().enumerate() {
        out.line(&format!(
            "{}. {} ({})",
            i + 1,
            property.title,
            property.formatted_price()
        ));
        out.line(&format!(
            "   {} | {} | {}",
            property.property_type,
            property.status_kind(),
            property.summary()
        ));
        if !property.location.is_empty() {
            out.line(&format!("   Location: {}", property.location));
        }
        out.line(&format!("   ID: {}", property.id));
    }
    Ok(())
}

fn print_property_detail(out: &Output, property: &Property) {
    out.line(&format!("{} (#{})", property.title, property.id));
    out.line(&format!("Price:    {}", property.formatted_price()));
    out.line(&format!("Type:     {}", property.property_type));
    out.line(&format!("Status:   {}", property.status_kind()));
    out.line(&format!("Layout:   {}", property.summary()));
    if !property.location.is_empty() {
        out.line(&format!("Location: {}", property.location));
    }
    out.line(&format!("Listed:   {}", format_date(&property.created_at)));
    if let Some(image) = property.primary_image() {
        out.line(&format!("Image:    {image}"));
    }
    if !property.description.is_empty() {
        out.line(&truncate_text(&property.description, ROW_WIDTH * 3));
    }
}

async fn handle_users(
    client: Arc<AdminClient>,
    auth: &AuthService,
    out: &Output,
    cmd: UsersCommand,
) -> anyhow::Result<()> {
    let mut store = UserStore::new(client);

    match cmd {
        UsersCommand::List { json } => {
            store.fetch().await;
            if let Some(message) = store.error() {
                bail!("{message}");
            }
            if json {
                return out.json(&store.users());
            }
            for user in store.users() {
                out.line(&format!(
                    "{}  {}  {}  kyc={}  joined {}",
                    user.id,
                    user.display_name(),
                    user.phone_number,
                    user.kyc_status,
                    format_date(&user.created_at)
                ));
            }
            Ok(())
        }
        UsersCommand::Stats => {
            store.fetch().await;
            if let Some(message) = store.error() {
                bail!("{message}");
            }
            let stats = store.statistics();
            out.line(&format!("Total:    {}", stats.total));
            out.line(&format!("Active:   {}", stats.active));
            out.line(&format!("Pending:  {}", stats.pending));
            out.line(&format!("Inactive: {}", stats.inactive));
            out.line(&format!("Premium:  {}", stats.premium));
            Ok(())
        }
        UsersCommand::SetStatus { id, status } => {
            require_login(auth)?;
            store.update_status(&id, &status).await?;
            println!("User {id} is now {status}");
            Ok(())
        }
        UsersCommand::Delete { id } => {
            require_login(auth)?;
            store.remove(&id).await?;
            println!("Deleted user {id}");
            Ok(())
        }
    }
}

async fn handle_lookup<T>(
    directory: &Directory<T>,
    auth: &AuthService,
    out: &Output,
    cmd: LookupCommand,
    draft: fn(String) -> T::Draft,
) -> anyhow::Result<()>
where
    T: LookupRecord,
{
    match cmd {
        LookupCommand::List { search } => {
            let records = directory.list_all().await?;
            let shown = Directory::search(&records, search.as_deref().unwrap_or_default());
            for record in shown {
                out.line(&format!("{:>5}  {}", record.id(), record.name()));
            }
            Ok(())
        }
        LookupCommand::Show { id } => {
            out.line(&format!("{:>5}  {}", id, directory.name(id).await));
            Ok(())
        }
        LookupCommand::Add { name } => {
            require_login(auth)?;
            let created = directory.add(&draft(name)).await?;
            debug!("Created {}: {}", T::KIND, created);
            println!("Added {}", T::KIND);
            Ok(())
        }
    }
}
