use anyhow::Result;
use colored::*;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use autoconnect_api::client::{
    ApiClient, ClientError, Effect, ListStatus, Session, TextFilter, VehicleListState,
};
use autoconnect_api::client::list_state::VehiclePageResponse;
use autoconnect_api::dto::vehicle_query::{SortBy, SortOrder};
use autoconnect_api::models::vehicle::VehicleStatus;

type FetchResult = (u64, Result<VehiclePageResponse, ClientError>);
type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("{}", "🚗 AutoConnect Dashboard".bright_blue().bold());
    println!("{}", "========================".bright_blue());

    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3333".to_string());
    let initial_query = std::env::args().nth(1).unwrap_or_default();

    let client = ApiClient::new(base_url)?;
    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !login_flow(&client, &mut session, &mut lines).await? {
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<FetchResult>();
    let (mut state, effects) = VehicleListState::new(&initial_query, Instant::now());
    run_effects(effects, &client, &session, &tx);
    print_help();

    loop {
        prompt()?;
        let deadline = state.next_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let now = Instant::now();
                match handle_command(&mut state, line.trim(), now) {
                    Command::Quit => break,
                    Command::Effects(effects) => {
                        // servida desde caché: no hay fetch que la dibuje después
                        let from_cache = !effects.is_empty()
                            && !effects.iter().any(|e| matches!(e, Effect::Fetch { .. }));
                        if from_cache && state.status() == &ListStatus::Ready {
                            if let Some(page) = state.current() {
                                render_page(page, &state);
                            }
                        }
                        run_effects(effects, &client, &session, &tx);
                    }
                    Command::Help => print_help(),
                    Command::Unknown => println!("{}", "❌ Comando inválido. Digite h para ajuda.".bright_red()),
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let effects = state.tick(Instant::now());
                run_effects(effects, &client, &session, &tx);
            }
            Some((request_id, result)) = rx.recv() => {
                let effects = state.apply_response(request_id, result, Instant::now());
                if effects.contains(&Effect::LoginRequired) {
                    session.clear();
                    println!("{}", "🔒 Sessão expirada. Faça login novamente.".bright_yellow());
                    if !login_flow(&client, &mut session, &mut lines).await? {
                        break;
                    }
                    let effects = state.refresh(Instant::now());
                    run_effects(effects, &client, &session, &tx);
                    continue;
                }
                if request_id == state.latest_request_id() {
                    match state.status() {
                        ListStatus::Ready => {
                            if let Some(page) = state.current() {
                                render_page(page, &state);
                            }
                        }
                        ListStatus::Failed(message) => println!("{}", format!("❌ {}", message).bright_red()),
                        _ => {}
                    }
                }
            }
        }
    }

    println!("{}", "👋 Até logo!".bright_green());
    Ok(())
}

enum Command {
    Effects(Vec<Effect>),
    Help,
    Quit,
    Unknown,
}

fn handle_command(state: &mut VehicleListState, line: &str, now: Instant) -> Command {
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
    let argument = argument.trim();

    let effects = match command {
        "q" => return Command::Quit,
        "h" | "?" => return Command::Help,
        "b" => {
            state.set_text_input(TextFilter::Brand, argument, now);
            Vec::new()
        }
        "m" => {
            state.set_text_input(TextFilter::Model, argument, now);
            Vec::new()
        }
        "s" => match argument {
            "" | "all" => state.set_status_filter(None, now),
            raw => match raw.parse::<VehicleStatus>() {
                Ok(status) => state.set_status_filter(Some(status), now),
                Err(_) => return Command::Unknown,
            },
        },
        "o" => {
            let mut parts = argument.split_whitespace();
            let sort_by = parts.next().and_then(|raw| raw.parse::<SortBy>().ok());
            let sort_order = parts
                .next()
                .map(|raw| raw.parse::<SortOrder>().ok())
                .unwrap_or(Some(SortOrder::Desc));
            match (sort_by, sort_order) {
                (Some(sort_by), Some(sort_order)) => state.set_sort(sort_by, sort_order, now),
                _ => return Command::Unknown,
            }
        }
        "l" => match argument.parse::<u32>() {
            Ok(limit) => state.set_page_size(limit, now),
            Err(_) => return Command::Unknown,
        },
        "g" => match argument.parse::<u32>() {
            Ok(page) => state.set_page(page, now),
            Err(_) => return Command::Unknown,
        },
        "n" => {
            let has_next = state
                .current()
                .map(|page| page.pagination.has_next_page)
                .unwrap_or(false);
            if !has_next {
                println!("{}", "ℹ️ Já está na última página".dimmed());
                return Command::Effects(Vec::new());
            }
            let next = state.query().page + 1;
            state.set_page(next, now)
        }
        "p" => {
            let prev = state.query().page.saturating_sub(1).max(1);
            state.set_page(prev, now)
        }
        "r" => state.refresh(now),
        "" => Vec::new(),
        _ => return Command::Unknown,
    };
    Command::Effects(effects)
}

fn run_effects(
    effects: Vec<Effect>,
    client: &ApiClient,
    session: &Session,
    tx: &mpsc::UnboundedSender<FetchResult>,
) {
    for effect in effects {
        match effect {
            Effect::ReplaceUrl(query) => println!("{}", format!("🔗 ?{}", query).dimmed()),
            Effect::Fetch { request_id, query } => {
                println!("{}", "⏳ Carregando veículos...".dimmed());
                let client = client.clone();
                let mut session = session.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = client.list_vehicles(&mut session, &query).await;
                    let _ = tx.send((request_id, result));
                });
            }
            Effect::LoginRequired => {}
        }
    }
}

/// Pide credenciales hasta lograr un login; `false` si se cerró la entrada
async fn login_flow(client: &ApiClient, session: &mut Session, lines: &mut InputLines) -> Result<bool> {
    println!();
    println!("{}", "🔐 LOGIN".bright_cyan().bold());
    println!("{}", "========".bright_cyan());

    loop {
        print!("{}", "Email: ".bright_yellow());
        io::stdout().flush()?;
        let Some(email) = lines.next_line().await? else {
            return Ok(false);
        };
        print!("{}", "Senha: ".bright_yellow());
        io::stdout().flush()?;
        let Some(password) = lines.next_line().await? else {
            return Ok(false);
        };

        match client.login(session, email.trim(), password.trim()).await {
            Ok(()) => {
                let role = session
                    .claims()
                    .map(|claims| claims.role.as_str())
                    .unwrap_or("-");
                println!("{}", format!("✅ Login realizado ({})", role).bright_green());
                return Ok(true);
            }
            Err(e) => println!("{}", format!("❌ {}", e).bright_red()),
        }
    }
}

fn prompt() -> io::Result<()> {
    print!("{}", "> ".bright_yellow());
    io::stdout().flush()
}

fn print_help() {
    println!();
    println!("{}", "📋 COMANDOS".bright_green().bold());
    println!("{}", "===========".bright_green());
    println!("b <texto>        🔍 Filtrar por marca");
    println!("m <texto>        🔍 Filtrar por modelo");
    println!("s <STATUS|all>   🏷️  AVAILABLE, RESERVED ou SOLD");
    println!("o <campo> [ord]  ↕️  createdAt, price, year, mileage, brand, model / asc, desc");
    println!("l <n>            📄 Itens por página (1-100)");
    println!("n / p / g <n>    ➡️  Próxima, anterior ou ir para página");
    println!("r                🔄 Limpar filtros e recarregar");
    println!("q                🚪 Sair");
}

fn render_page(page: &VehiclePageResponse, state: &VehicleListState) {
    let pagination = &page.pagination;
    println!();
    println!(
        "{}",
        format!(
            "🚗 {} veículos | página {} de {}",
            pagination.total,
            pagination.page,
            pagination.total_pages.max(1)
        )
        .bright_blue()
        .bold()
    );

    let brand = state.text_input(TextFilter::Brand);
    let model = state.text_input(TextFilter::Model);
    if !brand.is_empty() || !model.is_empty() {
        println!("{}", format!("   marca: '{}' modelo: '{}'", brand, model).dimmed());
    }

    if page.data.is_empty() {
        println!("{}", "   Nenhum veículo encontrado".yellow());
        return;
    }

    for item in &page.data {
        let vehicle = &item.vehicle;
        let status = match vehicle.status {
            VehicleStatus::Available => vehicle.status.as_str().green(),
            VehicleStatus::Reserved => vehicle.status.as_str().yellow(),
            VehicleStatus::Sold => vehicle.status.as_str().red(),
        };
        let mileage = vehicle
            .mileage
            .map(|km| format!("{} km", km))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {} {} {} | R$ {} | {} | {} | 📸 {}",
            vehicle.brand.bold(),
            vehicle.model,
            vehicle.year,
            vehicle.price,
            mileage,
            status,
            item.photos.len()
        );
    }
}
