use anyhow::Context;
use clap::{Parser, Subcommand};
use contracts::usecases::u508_unarchive_ozon_products::{
    EventLevel, RunEvent, RunOutcome, UnarchiveRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use unarchiver::shared::config;
use unarchiver::system;
use unarchiver::usecases::u508_unarchive_ozon_products::{
    OzonApiClient, RunError, UnarchiveService,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Восстановление товаров OZON из архива по списку offer_id."
)]
struct Cli {
    /// Путь к config.toml / config.json (по умолчанию рядом с exe или в текущей папке)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Показать магазины из конфигурации
    Accounts,

    /// Проверить товары из файла и восстановить архивные
    Run {
        /// Файл .xlsx / .xls / .ods / .csv со списком offer_id
        #[arg(long)]
        file: PathBuf,

        /// Имя магазина (по умолчанию первый из списка)
        #[arg(long)]
        account: Option<String>,
    },

    /// Тест соединения с OZON API
    TestApi {
        #[arg(long)]
        account: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = system::tracing::initialize()?;

    let config = Arc::new(
        config::load_config(cli.config.as_deref())
            .context("Не удалось загрузить конфигурацию")?,
    );
    let api = Arc::new(OzonApiClient::new(&config.api)?);
    let service = UnarchiveService::new(Arc::clone(&config), api);

    match cli.command {
        Command::Accounts => {
            for name in service.account_names() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Run { file, account } => {
            let account = config.find_account(account.as_deref())?;
            let request = UnarchiveRequest {
                account_name: account.name.clone(),
                file_path: file.display().to_string(),
            };
            run(&service, request, &log_file).await
        }
        Command::TestApi { account } => {
            let account = config.find_account(account.as_deref())?;
            println!("=== ТЕСТ API СОЕДИНЕНИЯ ===");
            println!("Магазин: {}", account.name);
            let result = service.start_connection_test(&account.name)?.await?;
            if let Some(status) = result.status {
                println!("Статус ответа: {}", status);
            }
            println!("{}", result.message);
            if let Some(details) = &result.details {
                println!("{}", details);
            }
            if result.success {
                Ok(())
            } else {
                anyhow::bail!("Тест API не пройден")
            }
        }
    }
}

async fn run(
    service: &UnarchiveService,
    request: UnarchiveRequest,
    log_file: &std::path::Path,
) -> anyhow::Result<()> {
    let handle = service.start_run(request)?;

    match handle.drain(render_event).await {
        Ok(RunOutcome::Completed(summary)) => {
            println!();
            println!("Готово! Обработка завершена.");
            println!("Восстановлено: {} товаров", summary.restore_requested);
            println!("Отчёт: {}", summary.report_path);
            Ok(())
        }
        Ok(RunOutcome::NothingToProcess) => {
            println!("Инфо: в файле не найдено offer_id.");
            Ok(())
        }
        Err(RunError::FetchFailed { errors }) => {
            anyhow::bail!(
                "Не удалось получить данные о товарах, ошибок: {} (подробности в {})",
                errors.len(),
                log_file.display()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn render_event(event: &RunEvent) {
    match event {
        RunEvent::Started { account, file, .. } => {
            println!("Магазин: {} | Файл: {}", account, file);
        }
        RunEvent::StateChanged { state, progress } => {
            println!("[{:>3}%] {}", progress, state);
        }
        RunEvent::Log { level, message, at } => {
            let time = at.with_timezone(&chrono::Local).format("%H:%M:%S");
            match level {
                EventLevel::Info => println!("{} {}", time, message),
                EventLevel::Warn | EventLevel::Error => eprintln!("{} {}", time, message),
            }
        }
        RunEvent::Completed { .. } | RunEvent::NothingToProcess { .. } => {}
        RunEvent::Failed {
            message,
            error_count,
        } => {
            eprintln!("{} (ошибок: {})", message, error_count);
        }
    }
}
