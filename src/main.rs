use std::io::Write;

use chatbot_frontend::{
    config::ClientConfig,
    logging,
    routes::{self, ChatView, LoginForm, RegisterForm, Route},
    services::message_store::{ChatMessage, MessageRole},
    state::AppState,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let config = ClientConfig::from_env()?;
    let state = AppState::from_config(&config).await?;
    info!(
        base_url = %config.base_url,
        session = %config.session_path.display(),
        "chat client starting"
    );

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut chat = ChatView::new();

    loop {
        let route = routes::resolve(state.navigator.current().await, &state.session).await;
        state.navigator.navigate(route).await;

        let keep_going = match route {
            Route::Login => login_screen(&state, &mut input).await?,
            Route::Register => register_screen(&state, &mut input).await?,
            Route::Chat => chat_screen(&state, &mut chat, &mut input).await?,
        };
        if !keep_going {
            break;
        }
    }

    println!("bye");
    Ok(())
}

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

/// Returns `false` when the user quits or stdin closes.
async fn login_screen(state: &AppState, input: &mut Input) -> anyhow::Result<bool> {
    println!("\n== Login ==  (:register to create an account, :quit to exit)");
    let Some(username) = prompt(input, "username: ").await? else {
        return Ok(false);
    };
    match username.trim() {
        ":quit" => return Ok(false),
        ":register" => {
            state.navigator.navigate(Route::Register).await;
            return Ok(true);
        }
        _ => {}
    }
    let Some(password) = prompt(input, "password: ").await? else {
        return Ok(false);
    };

    let mut form = LoginForm::new(username.trim(), password);
    if form.submit(state).await.is_err() {
        if let Some(error) = &form.error {
            println!("! {error}");
        }
    }
    Ok(true)
}

async fn register_screen(state: &AppState, input: &mut Input) -> anyhow::Result<bool> {
    println!("\n== Register ==  (:login to go back, :quit to exit)");
    let Some(username) = prompt(input, "username: ").await? else {
        return Ok(false);
    };
    match username.trim() {
        ":quit" => return Ok(false),
        ":login" => {
            state.navigator.navigate(Route::Login).await;
            return Ok(true);
        }
        _ => {}
    }
    let Some(password) = prompt(input, "password: ").await? else {
        return Ok(false);
    };

    let mut form = RegisterForm::new(username.trim(), password);
    if form.submit(state).await.is_err() {
        if let Some(error) = &form.error {
            println!("! {error}");
        }
    }
    Ok(true)
}

async fn chat_screen(
    state: &AppState,
    chat: &mut ChatView,
    input: &mut Input,
) -> anyhow::Result<bool> {
    let role = state.session.role().await.unwrap_or_else(|| "user".to_string());
    println!("\n== Chat ({role}) ==  (:clear, :logout, :quit)");
    for message in state.messages.messages().await {
        render(&message);
    }

    while state.navigator.current().await == Route::Chat {
        let Some(line) = prompt(input, "you> ").await? else {
            return Ok(false);
        };
        match line.trim() {
            ":quit" => return Ok(false),
            ":clear" => {
                chat.clear(state).await;
                println!("(cleared)");
            }
            ":logout" => {
                // Persistence failures are already logged; the view still leaves.
                let _ = chat.logout(state).await;
            }
            _ => {
                chat.input = line.clone();
                let Some(content) = chat.begin(state).await else {
                    continue;
                };
                if chat.awaiting_reply {
                    println!("(thinking...)");
                }
                let result = routes::chat::post_message(state, content).await;
                match chat.complete(state, result).await {
                    Ok(reply) => render(&reply),
                    Err(_) => {
                        if let Some(error) = &chat.error {
                            println!("! {error}");
                        }
                    }
                }
            }
        }
    }
    Ok(true)
}

fn render(message: &ChatMessage) {
    match message.role {
        MessageRole::User => println!("you> {}", message.content),
        MessageRole::Ai => println!("ai>  {}", message.content),
    }
}
