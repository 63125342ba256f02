use clap::{Arg, ArgMatches, Command};
use itertools::Itertools;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use arewa_accounts::auth::password::read_password;
use arewa_accounts::utils::io::{is_valid_email, prompt, prompt_with_confirmation};
use arewa_accounts::utils::logging::initialize_logging;
use arewa_accounts::utils::time::{format_duration, format_timestamp};
use arewa_accounts::{
    AccountDirectory, DirectoryConfig, FileStore, MemoryStore, Registration, Role,
};

fn build_cli() -> Command {
    Command::new("arewa-accounts")
        .about("Manage a local account directory: registration, login and password resets")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Directory holding the persisted users and reset tokens")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("data"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON configuration file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Append logs to this file instead of stderr")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("register")
                .about("Register a new account")
                .arg(Arg::new("email").help("Account email").required(true))
                .arg(Arg::new("name").long("name").help("Display name"))
                .arg(Arg::new("phone").long("phone").help("Phone number"))
                .arg(
                    Arg::new("role")
                        .long("role")
                        .help("customer, admin, vendor or rider")
                        .value_parser(clap::value_parser!(Role)),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Check credentials and show where the account lands")
                .arg(Arg::new("email").help("Account email").required(true)),
        )
        .subcommand(
            Command::new("request-reset")
                .about("Issue a password reset token")
                .arg(Arg::new("email").help("Account email").required(true)),
        )
        .subcommand(
            Command::new("validate-token")
                .about("Check a password reset token")
                .arg(Arg::new("token").help("Reset token").required(true)),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password using a reset token")
                .arg(Arg::new("token").help("Reset token").required(true)),
        )
        .subcommand(Command::new("list-users").about("List all registered accounts"))
        .subcommand(Command::new("shell").about("Interactive session"))
}

fn main() {
    let matches = build_cli().get_matches();

    let log_file = matches.get_one::<PathBuf>("log-file");
    if let Err(e) = initialize_logging(log_file.map(PathBuf::as_path)) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let config = DirectoryConfig::load_or_default(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
    )?;
    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"));

    // Sessions live only as long as this process, like a browser tab
    let mut directory =
        AccountDirectory::new(FileStore::open(data_dir)?, MemoryStore::new(), config)?;

    match matches.subcommand() {
        Some(("register", sub)) => handle_register(&mut directory, sub),
        Some(("login", sub)) => handle_login(&mut directory, required(sub, "email")),
        Some(("request-reset", sub)) => {
            handle_request_reset(&mut directory, required(sub, "email"))
        }
        Some(("validate-token", sub)) => {
            let email = directory.validate_token(required(sub, "token"))?;
            println!("Token is valid for {}", email);
            Ok(())
        }
        Some(("reset-password", sub)) => {
            handle_reset_password(&mut directory, required(sub, "token"))
        }
        Some(("list-users", _)) => handle_list_users(&directory),
        Some(("shell", _)) => run_shell(&mut directory),
        _ => Ok(()),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn ask_password(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    read_password()
}

fn ask_new_password() -> Result<String, Box<dyn Error>> {
    let password = ask_password("New password: ")?;
    let confirmation = ask_password("Confirm password: ")?;
    if password != confirmation {
        return Err("Passwords do not match.".into());
    }
    if password.is_empty() {
        return Err("Password must not be empty.".into());
    }
    Ok(password)
}

fn handle_register(
    directory: &mut AccountDirectory,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let email = required(matches, "email");
    if !is_valid_email(email) {
        return Err(format!("'{}' does not look like an email address.", email).into());
    }

    let mut registration = Registration::new(email, ask_new_password()?);
    if let Some(name) = matches.get_one::<String>("name") {
        registration = registration.name(name.clone());
    }
    if let Some(phone) = matches.get_one::<String>("phone") {
        registration = registration.phone(phone.clone());
    }
    if let Some(role) = matches.get_one::<Role>("role") {
        registration = registration.role(*role);
    }

    let user = directory.register(registration)?;
    println!("Registered {} as {} (id {})", user.email, user.role, user.id);
    Ok(())
}

fn handle_login(directory: &mut AccountDirectory, email: &str) -> Result<(), Box<dyn Error>> {
    let password = ask_password("Password: ")?;
    let user = directory.login(email, &password)?;
    let name = if user.name.is_empty() { &user.email } else { &user.name };
    println!("Welcome, {}!", name);
    println!("Continue to {}", directory.route_after_login(None));
    Ok(())
}

fn handle_request_reset(
    directory: &mut AccountDirectory,
    email: &str,
) -> Result<(), Box<dyn Error>> {
    let ticket = directory.request_reset(email)?;
    println!("Reset token: {}", ticket.token);
    println!("Reset link:  {}", ticket.reset_url);
    println!(
        "The token expires in {}.",
        format_duration(directory.config().reset_token_ttl_secs)
    );
    Ok(())
}

fn handle_reset_password(
    directory: &mut AccountDirectory,
    token: &str,
) -> Result<(), Box<dyn Error>> {
    // Fail fast on a dead token before asking for a password
    let email = directory.validate_token(token)?;
    println!("Resetting password for {}", email);
    let password = ask_new_password()?;
    directory.reset_password(token, &password)?;
    println!("Password reset successful.");
    Ok(())
}

fn handle_list_users(directory: &AccountDirectory) -> Result<(), Box<dyn Error>> {
    let users = directory.list_users()?;
    if users.is_empty() {
        println!("No accounts registered.");
        return Ok(());
    }

    for user in users.iter().sorted_by(|a, b| a.created_at.cmp(&b.created_at)) {
        println!(
            "{}  {:<8}  {:<30}  {:<20}  {}",
            format_timestamp(&user.created_at),
            user.role,
            user.email,
            user.name,
            user.phone
        );
    }
    Ok(())
}

fn show_shell_help() {
    println!("\nCommands:");
    println!("  login <email>    Log in");
    println!("  logout           Log out");
    println!("  whoami           Show the current session");
    println!("  route            Show where the current session lands");
    println!("  reset <email>    Issue a password reset token");
    println!("  users            List accounts");
    println!("  help             Show this help");
    println!("  exit             Leave the shell");
}

fn run_shell(directory: &mut AccountDirectory) -> Result<(), Box<dyn Error>> {
    println!("\n=== Arewa accounts shell ===");
    show_shell_help();

    loop {
        let line = match prompt("\n> ") {
            Ok(line) => line,
            // Input closed, same as exit without the confirmation
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                println!();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (line.as_str(), ""),
        };

        // Domain failures are reported and the shell carries on
        let result: Result<(), Box<dyn Error>> = match command {
            "" => Ok(()),
            "login" if !argument.is_empty() => handle_login(directory, argument),
            "logout" => directory
                .logout()
                .map(|landing| println!("Logged out. Continue to {}", landing))
                .map_err(Into::into),
            "whoami" => directory
                .current_session()
                .map(|session| match session {
                    Some(session) => {
                        println!("{} ({}, id {})", session.email, session.role, session.id)
                    }
                    None => println!("Not logged in."),
                })
                .map_err(Into::into),
            "route" => {
                println!("{}", directory.route_after_login(None));
                Ok(())
            }
            "reset" if !argument.is_empty() => handle_request_reset(directory, argument),
            "users" => handle_list_users(directory),
            "help" => {
                show_shell_help();
                Ok(())
            }
            "exit" | "quit" => {
                if directory.current_session()?.is_some()
                    && !prompt_with_confirmation("You are still logged in.", "Exit anyway?")?
                {
                    continue;
                }
                println!("Goodbye!");
                return Ok(());
            }
            _ => Err(format!("Unknown command '{}'. Type 'help' for commands.", line).into()),
        };

        if let Err(e) = result {
            println!("{}", e);
        }
    }
}
