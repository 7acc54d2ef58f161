use wikirace::commands::command_argument_builder;
use wikirace::handlers::{handle_links, handle_search};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    let code = match chosen_command.subcommand() {
        Some(("search", primary_command)) => handle_search(primary_command, quiet).await,
        Some(("links", primary_command)) => handle_links(primary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    std::process::exit(code);
}
