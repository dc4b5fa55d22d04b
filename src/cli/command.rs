use crate::cli::output::{
    render_value,
    write_table,
};
use crate::client::builder::Builder;
use crate::client::client::Client;
use crate::errors::InspectrsError;
use crate::resource::InterfaceResource;
use crate::response::IntrospectionStatus;
use crate::transport::base::DEFAULT_URL;
use clap::{
    Parser,
    Subcommand,
};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// The inspectrs command line interface -- thin subcommands over the client library, one per
/// introspection API operation.
#[derive(Debug, Parser)]
#[command(
    name = "inspectrs",
    version,
    about = "client and cli for the ironic inspector hardware-introspection HTTP API"
)]
pub struct Cli {
    /// Inspector URL in form http://host:port[/vMAJ].
    #[arg(long, env = "INSPECTOR_URL", default_value = DEFAULT_URL, global = true)]
    pub inspector_url: String,

    /// Inspector API version the server must support, in form MAJ or MAJ.MIN.
    #[arg(long, env = "INSPECTOR_VERSION", global = true)]
    pub inspector_api_version: Option<String>,

    /// Authentication token sent with each request.
    #[arg(long, env = "INSPECTOR_AUTH_TOKEN", hide_env_values = true, global = true)]
    pub auth_token: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The inspectrs subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the introspection.
    Start(StartArgs),

    /// Get introspection status.
    Status(NodeArgs),

    /// List introspection statuses.
    List(ListArgs),

    /// Introspection data commands.
    #[command(subcommand)]
    Data(DataCommand),

    /// Abort running introspection for a node.
    Abort(NodeArgs),

    /// Reprocess stored introspection data.
    Reprocess(NodeArgs),

    /// Introspection rules commands.
    #[command(subcommand)]
    Rule(RuleCommand),

    /// Interface data from the last introspection of a node.
    #[command(subcommand)]
    Interface(InterfaceCommand),
}

/// Arguments for subcommands operating on a single node.
#[derive(Debug, clap::Args)]
pub struct NodeArgs {
    /// Baremetal node UUID or name.
    pub node: String,
}

/// Arguments for the `start` subcommand.
#[derive(Debug, clap::Args)]
pub struct StartArgs {
    /// Baremetal node UUID(s) or name(s).
    #[arg(required = true)]
    pub node: Vec<String>,

    /// Wait for introspection to finish; the result will be displayed in the end.
    #[arg(long)]
    pub wait: bool,

    /// Check if all nodes finished without errors and display nothing otherwise.
    #[arg(long)]
    pub check_errors: bool,
}

/// Arguments for the `list` subcommand.
#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Pagination marker -- UUID of the last node on the previous page.
    #[arg(long)]
    pub marker: Option<String>,

    /// Pagination limit.
    #[arg(long)]
    pub limit: Option<u32>,
}

/// The `data` subcommands.
#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Save or display raw introspection data.
    Save(DataSaveArgs),
}

/// Arguments for the `data save` subcommand.
#[derive(Debug, clap::Args)]
pub struct DataSaveArgs {
    /// Baremetal node UUID or name.
    pub node: String,

    /// Downloaded introspection data filename (default: stdout).
    #[arg(long, value_name = "filename")]
    pub file: Option<PathBuf>,

    /// Download the raw data received from the discovery agent rather than the processed data.
    #[arg(long)]
    pub unprocessed: bool,
}

/// The `rule` subcommands.
#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// Import one or several introspection rules from a JSON file.
    Import(RuleImportArgs),

    /// List all introspection rules.
    List,

    /// Show an introspection rule.
    Show(RuleUuidArgs),

    /// Delete an introspection rule.
    Delete(RuleUuidArgs),

    /// Drop all introspection rules.
    Purge,
}

/// Arguments for the `rule import` subcommand.
#[derive(Debug, clap::Args)]
pub struct RuleImportArgs {
    /// JSON file to import, may contain one or several rules.
    pub file: PathBuf,
}

/// Arguments for rule subcommands operating on a single rule.
#[derive(Debug, clap::Args)]
pub struct RuleUuidArgs {
    /// Rule UUID.
    pub uuid: String,
}

/// The `interface` subcommands.
#[derive(Debug, Subcommand)]
pub enum InterfaceCommand {
    /// List interface data, one row per interface.
    List(InterfaceListArgs),

    /// Show interface data for one interface.
    Show(InterfaceShowArgs),
}

/// Arguments for the `interface list` subcommand.
#[derive(Debug, clap::Args)]
pub struct InterfaceListArgs {
    /// Baremetal node UUID or name.
    pub node: String,

    /// Interface field to display, repeatable.
    #[arg(long = "fields", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// VLAN id to filter the listing on, repeatable.
    #[arg(long = "vlan", value_name = "VLAN")]
    pub vlan: Vec<u64>,

    /// Display all known interface fields.
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the `interface show` subcommand.
#[derive(Debug, clap::Args)]
pub struct InterfaceShowArgs {
    /// Baremetal node UUID or name.
    pub node: String,

    /// Interface name.
    pub interface: String,

    /// Interface field to display, repeatable (default: all known fields).
    #[arg(long = "fields", value_name = "FIELD")]
    pub fields: Vec<String>,
}

/// Build a client from the global options and run the selected subcommand, writing any tabular
/// output to `out`.
///
/// # Errors
///
/// Returns an `InspectrsError` on bad arguments, connection problems, or errors reported from
/// the server; the binary renders it on stderr and exits non-zero.
pub fn run(
    cli: Cli,
    out: &mut dyn Write,
) -> Result<(), InspectrsError> {
    let Cli {
        inspector_url,
        inspector_api_version,
        auth_token,
        command,
    } = cli;

    if let Command::Start(args) = &command {
        if args.check_errors && !args.wait {
            return Err(InspectrsError::Validation(String::from(
                "--check-errors can only be used with --wait",
            )));
        }
    }

    let mut builder = Builder::new(&inspector_url);

    if let Some(raw) = inspector_api_version {
        builder = builder.api_version(raw.parse()?);
    }

    if let Some(token) = auth_token {
        builder = builder.auth_token(&token);
    }

    let client = builder.build()?;

    execute(command, &client, out)
}

/// Run one subcommand against an already built client.
///
/// # Errors
///
/// Returns an `InspectrsError` on bad arguments, connection problems, or errors reported from
/// the server.
pub fn execute(
    command: Command,
    client: &Client,
    out: &mut dyn Write,
) -> Result<(), InspectrsError> {
    match command {
        Command::Start(args) => start(&args, client, out),

        Command::Status(args) => {
            let status = client.get_status(&args.node)?;

            write_fields(out, &serde_json::to_value(&status)?)
        }

        Command::List(args) => {
            let statuses = client.list_statuses(args.marker.as_deref(), args.limit)?;

            write_status_table(out, &statuses)
        }

        Command::Data(DataCommand::Save(args)) => {
            let processed = !args.unprocessed;

            if let Some(path) = args.file {
                let data = client.get_data_raw(&args.node, processed)?;

                fs::write(path, data)?;
            } else {
                let data = client.get_data(&args.node, processed)?;

                serde_json::to_writer(&mut *out, &data)?;
                writeln!(out)?;
            }

            Ok(())
        }

        Command::Abort(args) => client.abort(&args.node),

        Command::Reprocess(args) => client.reprocess(&args.node),

        Command::Rule(command) => rule(command, client, out),

        Command::Interface(command) => interface(command, client, out),
    }
}

fn start(
    args: &StartArgs,
    client: &Client,
    out: &mut dyn Write,
) -> Result<(), InspectrsError> {
    for node in &args.node {
        client.introspect(node, None)?;
    }

    if !args.wait {
        return Ok(());
    }

    eprintln!("Waiting for introspection to finish...");

    let node_ids: Vec<&str> = args.node.iter().map(String::as_str).collect();

    let result = client.wait_for_finish(&node_ids)?;

    if args.check_errors {
        let failed: Vec<String> = result
            .iter()
            .filter(|&(_, status)| status.failed())
            .map(|(node, _)| node.clone())
            .collect();

        if !failed.is_empty() {
            return Err(InspectrsError::IntrospectionFailed { nodes: failed });
        }
    }

    let rows: Vec<Vec<String>> = result
        .iter()
        .map(|(node, status)| vec![node.clone(), status.error.clone().unwrap_or_default()])
        .collect();

    Ok(write_table(out, &["UUID", "Error"], &rows)?)
}

fn rule(
    command: RuleCommand,
    client: &Client,
    out: &mut dyn Write,
) -> Result<(), InspectrsError> {
    match command {
        RuleCommand::Import(args) => {
            let parsed: Value = serde_json::from_str(&fs::read_to_string(&args.file)?)?;

            let rules = match parsed {
                Value::Array(list) => list,
                single => vec![single],
            };

            let mut rows = Vec::with_capacity(rules.len());

            for rule in rules {
                let imported = client.rules().from_json(rule)?;

                rows.push(vec![
                    imported.uuid,
                    imported.description.unwrap_or_default(),
                ]);
            }

            Ok(write_table(out, &["UUID", "Description"], &rows)?)
        }

        RuleCommand::List => {
            let rows: Vec<Vec<String>> = client
                .rules()
                .get_all()?
                .into_iter()
                .map(|rule| vec![rule.uuid, rule.description.unwrap_or_default()])
                .collect();

            Ok(write_table(out, &["UUID", "Description"], &rows)?)
        }

        RuleCommand::Show(args) => {
            let rule = client.rules().get(&args.uuid)?;

            write_fields(out, &serde_json::to_value(&rule)?)
        }

        RuleCommand::Delete(args) => client.rules().delete(&args.uuid),

        RuleCommand::Purge => client.rules().delete_all(),
    }
}

fn interface(
    command: InterfaceCommand,
    client: &Client,
    out: &mut dyn Write,
) -> Result<(), InspectrsError> {
    match command {
        InterfaceCommand::List(args) => {
            let resource = interface_resource(&args.fields, args.detailed)?;

            let rows: Vec<Vec<String>> = client
                .get_all_interface_data(&args.node, &resource, &args.vlan)?
                .iter()
                .map(|row| row.iter().map(render_value).collect())
                .collect();

            Ok(write_table(out, resource.labels(), &rows)?)
        }

        InterfaceCommand::Show(args) => {
            // show defaults to every known field rather than the short listing selection
            let resource = interface_resource(&args.fields, args.fields.is_empty())?;

            let row = client.get_interface_data(&args.node, &args.interface, &resource)?;

            let rows: Vec<Vec<String>> = resource
                .labels()
                .iter()
                .zip(row.iter())
                .map(|(&label, value)| vec![label.to_owned(), render_value(value)])
                .collect();

            Ok(write_table(out, &["Field", "Value"], &rows)?)
        }
    }
}

fn interface_resource(
    fields: &[String],
    detailed: bool,
) -> Result<InterfaceResource, InspectrsError> {
    if detailed {
        return Ok(InterfaceResource::detailed());
    }

    if fields.is_empty() {
        return Ok(InterfaceResource::default());
    }

    let field_ids: Vec<&str> = fields.iter().map(String::as_str).collect();

    InterfaceResource::new(&field_ids)
}

fn write_status_table(
    out: &mut dyn Write,
    statuses: &[IntrospectionStatus],
) -> Result<(), InspectrsError> {
    let rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|status| {
            vec![
                status.uuid.clone(),
                status.started_at.clone().unwrap_or_default(),
                status.finished_at.clone().unwrap_or_default(),
                status.error.clone().unwrap_or_default(),
            ]
        })
        .collect();

    Ok(write_table(
        out,
        &["UUID", "Started at", "Finished at", "Error"],
        &rows,
    )?)
}

/// Write the fields of a JSON object as a Field/Value table, sorted by field name, with the
/// self-links dropped.
fn write_fields(
    out: &mut dyn Write,
    value: &Value,
) -> Result<(), InspectrsError> {
    let rows: Vec<Vec<String>> = value
        .as_object()
        .into_iter()
        .flatten()
        .filter(|&(name, _)| name != "links")
        .map(|(name, value)| vec![name.clone(), render_value(value)])
        .collect();

    Ok(write_table(out, &["Field", "Value"], &rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn start_flags_parse() {
        let cli = parse(&["inspectrs", "start", "--wait", "--check-errors", "uuid1", "uuid2"]);

        match cli.command {
            Command::Start(args) => {
                assert_eq!(vec!["uuid1", "uuid2"], args.node);
                assert!(args.wait);
                assert!(args.check_errors);
            }
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn start_requires_at_least_one_node() {
        assert!(Cli::try_parse_from(["inspectrs", "start"]).is_err());
    }

    #[test]
    fn global_options_parse_after_the_subcommand() {
        let cli = parse(&[
            "inspectrs",
            "status",
            "uuid1",
            "--inspector-url",
            "http://inspector.example.com:5050",
            "--inspector-api-version",
            "1.5",
        ]);

        assert_eq!("http://inspector.example.com:5050", cli.inspector_url);
        assert_eq!(Some("1.5"), cli.inspector_api_version.as_deref());
    }

    #[test]
    fn list_pagination_flags_parse() {
        let cli = parse(&["inspectrs", "list", "--marker", "uuid1", "--limit", "42"]);

        match cli.command {
            Command::List(args) => {
                assert_eq!(Some("uuid1"), args.marker.as_deref());
                assert_eq!(Some(42), args.limit);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn interface_list_repeatable_flags_parse() {
        let cli = parse(&[
            "inspectrs",
            "interface",
            "list",
            "uuid1",
            "--vlan",
            "104",
            "--vlan",
            "201",
            "--fields",
            "interface",
            "--fields",
            "switch_port_mtu",
        ]);

        match cli.command {
            Command::Interface(InterfaceCommand::List(args)) => {
                assert_eq!(vec![104, 201], args.vlan);
                assert_eq!(vec!["interface", "switch_port_mtu"], args.fields);
            }
            other => panic!("expected interface list, got {other:?}"),
        }
    }

    #[test]
    fn check_errors_without_wait_is_rejected_before_any_request() {
        let cli = parse(&["inspectrs", "start", "--check-errors", "uuid1"]);

        let err = run(cli, &mut Vec::<u8>::new()).unwrap_err();

        assert!(matches!(err, InspectrsError::Validation(_)));
    }

    #[test]
    fn malformed_api_version_is_rejected_before_any_request() {
        let cli = parse(&[
            "inspectrs",
            "--inspector-api-version",
            "banana",
            "status",
            "uuid1",
        ]);

        let err = run(cli, &mut Vec::<u8>::new()).unwrap_err();

        assert!(matches!(err, InspectrsError::Validation(_)));
    }
}
