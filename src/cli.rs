use std::io::Write as _;

use crate::config::AppConfig;
use crate::query::export_csv::to_semicolon_csv;
use crate::query::export_csv::ExportError;
use crate::query::{validate_detail_name, ALL_TEAMS};
use crate::roster::RosterService;
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Teams,
    Search,
    Details,
    Sources,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("teams") => Some(Command::Teams),
        Some("search") => Some(Command::Search),
        Some("details") => Some(Command::Details),
        Some("sources") => Some(Command::Sources),
        _ => None,
    }
}

const USAGE: &str = "usage: bid_roster <serve|teams|search|details|sources>";

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };

    match command {
        Command::Serve => handle_serve(config),
        Command::Teams => with_roster(&config, handle_teams),
        Command::Search => with_roster(&config, |roster| handle_search(roster, &config, args)),
        Command::Details => with_roster(&config, |roster| handle_details(roster, args)),
        Command::Sources => with_roster(&config, handle_sources),
    }
}

fn with_roster(config: &AppConfig, run: impl FnOnce(&RosterService) -> i32) -> i32 {
    match RosterService::from_config(config) {
        Ok(roster) => run(&roster),
        Err(err) => {
            eprintln!("failed to open roster: {err}");
            1
        }
    }
}

fn handle_serve(config: AppConfig) -> i32 {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return 1;
        }
    };
    match runtime.block_on(server::run_server(config)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_teams(roster: &RosterService) -> i32 {
    match roster.teams() {
        Ok(teams) => {
            if teams.is_empty() {
                eprintln!("no teams found");
            }
            for team in teams.iter() {
                println!("{team}");
            }
            0
        }
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            1
        }
    }
}

/// Flags after the command: `--team <name>`, `--limit <n>`, `--csv`; the first bare word is the name.
#[derive(Debug, Default, PartialEq, Eq)]
struct QueryArgs {
    name: String,
    team: Option<String>,
    limit: Option<String>,
    csv: bool,
}

fn parse_query_args(args: &[String]) -> Result<QueryArgs, String> {
    let mut parsed = QueryArgs::default();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--team" => parsed.team = Some(rest.next().ok_or("--team needs a value")?.clone()),
            "--limit" => parsed.limit = Some(rest.next().ok_or("--limit needs a value")?.clone()),
            "--csv" => parsed.csv = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
            word if parsed.name.is_empty() => parsed.name = word.to_string(),
            word => return Err(format!("unexpected argument '{word}'")),
        }
    }
    Ok(parsed)
}

fn handle_search(roster: &RosterService, config: &AppConfig, args: &[String]) -> i32 {
    let parsed = match parse_query_args(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{msg}\nusage: bid_roster search [<name>] [--team <team>] [--limit <n>] [--csv]");
            return 2;
        }
    };
    let limit = match parsed.limit.as_deref().map(str::parse::<usize>).transpose() {
        Ok(limit) => limit,
        Err(_) => {
            eprintln!("invalid limit '{}'", parsed.limit.unwrap_or_default());
            return 2;
        }
    };
    let limit = match config.limits.validate(limit) {
        Ok(limit) => limit,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let team = parsed.team.as_deref().unwrap_or(ALL_TEAMS);

    let rows = match roster.search(&parsed.name, Some(team), limit) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            return 1;
        }
    };

    if parsed.csv {
        return write_csv(to_semicolon_csv(&rows[..]));
    }
    if rows.is_empty() {
        eprintln!("no records found for the given filters");
    }
    print_json(&serde_json::json!({
        "count": rows.len(),
        "limit": limit,
        "rows": &rows[..],
    }))
}

fn handle_details(roster: &RosterService, args: &[String]) -> i32 {
    let parsed = match parse_query_args(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{msg}\nusage: bid_roster details <name> [--csv]");
            return 2;
        }
    };
    let name = match validate_detail_name(&parsed.name) {
        Ok(name) => name,
        Err(err) => {
            eprintln!("{err}\nusage: bid_roster details <name> [--csv]");
            return 2;
        }
    };

    if parsed.csv {
        return match roster.player_details(name) {
            Ok(rows) => write_csv(to_semicolon_csv(&rows[..])),
            Err(err) => {
                eprintln!("failed to load roster: {err}");
                1
            }
        };
    }

    match roster.player_profiles(name) {
        Ok(players) => {
            if players.is_empty() {
                eprintln!("no player found with that name");
            }
            print_json(&serde_json::json!({ "count": players.len(), "players": players }))
        }
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            1
        }
    }
}

fn handle_sources(roster: &RosterService) -> i32 {
    match roster.sources() {
        Ok(report) => print_json(&report),
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            1
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

fn write_csv(bytes: Result<Vec<u8>, ExportError>) -> i32 {
    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to export csv: {err}");
            return 1;
        }
    };
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&bytes).and_then(|()| stdout.flush()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("failed to write csv: {err}");
            1
        }
    }
}
