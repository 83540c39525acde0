//! Console mode.
//!
//! A line-oriented protocol over stdin/stdout:
//! - Plain lines are sent to the dialog as messages
//! - Lines starting with `#` are console commands (quit, state, transcript, help)

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use waterwatch_core::{QueryConsole, QueryService};

fn print_commands() {
    println!("Commands:");
    println!("  #quit        - Exit");
    println!("  #state       - Show the conversation state");
    println!("  #transcript  - Show every exchange so far");
    println!("  #help        - Show this help");
}

/// Run one conversation against `service` until stdin closes or `#quit`.
pub fn run_console(service: Arc<QueryService>) -> io::Result<()> {
    let mut console = QueryConsole::new(service);

    println!("=== waterwatch console ===");
    println!("Conversation: {}", console.conversation_id());
    println!();
    print_commands();
    println!();
    println!("Send a region name to begin:");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "state" => {
                    let state = console.state();
                    println!("[STATE] {}", state.step());
                    println!("  Region: {}", state.region().unwrap_or("-"));
                    println!("  Province: {}", state.province().unwrap_or("-"));
                    println!("  District: {}", state.district().unwrap_or("-"));
                }
                "transcript" => print!("{}", console.transcript_text()),
                "help" => print_commands(),
                other => println!("[ERROR] Unknown command: #{other}"),
            }
            stdout.flush()?;
            continue;
        }

        let reply = console.send(line);
        println!("{}", reply.response);
        println!();
        stdout.flush()?;
    }

    Ok(())
}
