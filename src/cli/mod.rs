pub mod commands;

use std::io::{self, Write};
use uuid::Uuid;

use crate::chat::ChatService;
use crate::cli::commands::{Commands, EscalationAction, FaqAction, SessionAction};
use crate::config::AppConfig;
use crate::db::{get_connection, service::DbService};
use crate::error::ChatError;
use crate::llm::ProviderFactory;

pub async fn run_cli(command: Commands, config_path: String) -> Result<(), ChatError> {
    let config = AppConfig::load(&config_path)?;

    match command {
        Commands::Serve => Err(ChatError::Configuration(
            "serve is handled by the server entry point".to_string(),
        )),
        Commands::Chat { session } => run_repl(session, config).await,
        Commands::Session { action } => run_session(action, &config),
        Commands::Faq { action } => run_faq(action, &config),
        Commands::Escalation { action } => run_escalation(action, &config),
    }
}

fn run_session(action: SessionAction, config: &AppConfig) -> Result<(), ChatError> {
    let pool = get_connection(&config.database)?;
    let conn = pool
        .lock()
        .map_err(|_| ChatError::Dependency("database connection lock poisoned".to_string()))?;

    match action {
        SessionAction::Create => {
            let session = DbService::insert_session(&conn)?;
            println!("Created Session: {}", session.id);
        }
        SessionAction::List => {
            let sessions = DbService::list_sessions(&conn, 50, 0)?;
            if sessions.is_empty() {
                println!("No sessions found.");
            } else {
                println!("{:<38} | {}", "ID", "Created At");
                println!("{:-<38}-+-{:-<20}", "", "");
                for s in sessions {
                    println!("{:<38} | {}", s.id.to_string(), s.created_at);
                }
            }
        }
        SessionAction::Show { id } => {
            if DbService::get_session(&conn, id)?.is_none() {
                return Err(ChatError::Validation(format!("Session {} not found.", id)));
            }
            for m in DbService::get_messages(&conn, id, 1000, 0)? {
                println!("[{}] {}: {}", m.created_at, m.sender.to_uppercase(), m.content);
            }
        }
    }
    Ok(())
}

fn run_faq(action: FaqAction, config: &AppConfig) -> Result<(), ChatError> {
    let pool = get_connection(&config.database)?;
    let conn = pool
        .lock()
        .map_err(|_| ChatError::Dependency("database connection lock poisoned".to_string()))?;

    match action {
        FaqAction::Add { question, answer } => {
            if question.trim().is_empty() || answer.trim().is_empty() {
                return Err(ChatError::Validation("question and answer are required".to_string()));
            }
            let faq = DbService::insert_faq(&conn, question.trim(), answer.trim())?;
            println!("Added FAQ #{}", faq.id);
        }
        FaqAction::List => {
            let faqs = DbService::list_faqs(&conn)?;
            if faqs.is_empty() {
                println!("No FAQ entries.");
            }
            for faq in faqs {
                println!("#{} Q: {}\n    A: {}", faq.id, faq.question, faq.answer);
            }
        }
        FaqAction::Remove { id } => {
            if DbService::delete_faq(&conn, id)? {
                println!("Removed FAQ #{}", id);
            } else {
                println!("FAQ #{} not found.", id);
            }
        }
    }
    Ok(())
}

fn run_escalation(action: EscalationAction, config: &AppConfig) -> Result<(), ChatError> {
    let pool = get_connection(&config.database)?;
    let conn = pool
        .lock()
        .map_err(|_| ChatError::Dependency("database connection lock poisoned".to_string()))?;

    match action {
        EscalationAction::List { limit } => {
            let escalations = DbService::list_escalations(&conn, limit)?;
            if escalations.is_empty() {
                println!("No escalations recorded.");
            }
            for e in escalations {
                println!("{} | session {} | {}", e.created_at, e.session_id, e.user_message);
            }
        }
    }
    Ok(())
}

async fn run_repl(session: Option<Uuid>, config: AppConfig) -> Result<(), ChatError> {
    let pool = get_connection(&config.database)?;
    let llm = ProviderFactory::create_default(&config)?;
    let service = ChatService::new(pool, llm);

    let session_id = match session {
        Some(id) => id.to_string(),
        None => service.create_session()?.id.to_string(),
    };
    // Fails early on an unknown session id
    service.history(&session_id)?;

    println!("--- Support Chat ---");
    println!("Session: {}", session_id);
    println!("Type /escalate to ask for a human, /exit to quit.");
    println!("--------------------");

    let stdin = io::stdin();
    loop {
        print!("\nYou> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }
        if text == "/escalate" {
            match service.escalate(&session_id, None) {
                Ok(confirmation) => println!("Support> {}", confirmation),
                Err(e) => eprintln!("Could not escalate: {}", e),
            }
            continue;
        }

        match service.handle_message(&session_id, text).await {
            Ok(reply) => {
                let tag = if reply.from_faq { " [FAQ]" } else { "" };
                println!("Support{}> {}", tag, reply.response);
                if reply.needs_escalation {
                    println!("(Type /escalate to reach a human agent.)");
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                println!("Support> I apologize, but I'm having trouble processing your request. Please try again or type /escalate to reach a human agent.");
            }
        }
    }

    Ok(())
}
