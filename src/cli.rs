//! Command-line interface for the `estate-admin` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::Verbosity;
use crate::repository::{SortField, SortOrder};
use crate::rtl::Language;

/// estate-admin - manage listings, users and reference data on the
/// real-estate investment platform
#[derive(Debug, Parser)]
#[command(name = "estate-admin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Interface language (en, ar); overrides the configured one
    #[arg(long, global = true, value_name = "LANG")]
    pub lang: Option<Language>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and manage property listings
    #[command(subcommand)]
    Properties(PropertiesCommand),

    /// Browse and manage platform users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Cities reference data
    #[command(subcommand)]
    Cities(LookupCommand),

    /// Property types reference data
    #[command(subcommand)]
    Types(LookupCommand),

    /// Sign in as an administrator
    Login(LoginArgs),

    /// Forget the saved session
    Logout,

    /// Show the signed-in administrator
    Whoami,
}

#[derive(Debug, Subcommand)]
pub enum PropertiesCommand {
    /// List listings
    List(ListPropertiesArgs),

    /// Show one listing
    Show {
        id: i64,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summary statistics over all listings
    Stats,

    /// Delete a listing
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct ListPropertiesArgs {
    /// Only listings that are available
    #[arg(long)]
    pub available: bool,

    /// Only listings of this type (case-insensitive)
    #[arg(long = "type", value_name = "TYPE")]
    pub property_type: Option<String>,

    /// Keep listings whose title, description, location or type match
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long, default_value = "created_at")]
    pub sort: SortField,

    #[arg(long, default_value = "desc")]
    pub order: SortOrder,

    /// Maximum number of listings to show
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(long)]
        json: bool,
    },

    /// KYC and role counts
    Stats,

    /// Change a user's status
    SetStatus { id: String, status: String },

    /// Delete a user
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum LookupCommand {
    /// List every record
    List {
        /// Only names containing this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one record by id
    Show { id: i64 },

    /// Create a record
    Add { name: String },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Phone number the account was registered with
    #[arg(long)]
    pub phone: String,

    #[arg(long, env = "ESTATE_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), "estate-admin");
    }

    #[test]
    fn test_parse_property_list() {
        let cli = Cli::parse_from([
            "estate-admin",
            "-v",
            "--lang",
            "ar",
            "properties",
            "list",
            "--available",
            "--sort",
            "price",
            "--order",
            "asc",
            "-n",
            "5",
        ]);

        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        assert_eq!(cli.lang, Some(Language::Ar));
        match cli.command {
            Command::Properties(PropertiesCommand::List(args)) => {
                assert!(args.available);
                assert_eq!(args.sort, SortField::Price);
                assert_eq!(args.order, SortOrder::Asc);
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_defaults_to_newest_first() {
        let cli = Cli::parse_from(["estate-admin", "properties", "list"]);
        match cli.command {
            Command::Properties(PropertiesCommand::List(args)) => {
                assert_eq!(args.sort, SortField::CreatedAt);
                assert_eq!(args.order, SortOrder::Desc);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_lookup_and_users() {
        let cli = Cli::parse_from(["estate-admin", "types", "add", "Duplex"]);
        assert!(matches!(
            cli.command,
            Command::Types(LookupCommand::Add { ref name }) if name == "Duplex"
        ));

        let cli = Cli::parse_from(["estate-admin", "users", "set-status", "u1", "active"]);
        assert!(matches!(cli.command, Command::Users(UsersCommand::SetStatus { .. })));
    }

    #[test]
    fn test_bad_sort_field_is_rejected() {
        let result = Cli::try_parse_from(["estate-admin", "properties", "list", "--sort", "color"]);
        assert!(result.is_err());
    }
}
