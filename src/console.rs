use crate::api::ReportFile;
use crate::session::{
    Notice, NoticeLevel, PredictionForm, Role, SessionController, TranscriptEntry, read_report,
};
use crate::utils::split_args;
use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

const BANNER: &str = "AI Health Assistant\nType a question to chat, or /help for commands.\n";

const HELP: &str = "\
Commands:
  <text>                  ask the assistant
  /set key=value ...      fill prediction form fields
  /form                   show the prediction form
  /predict [key=value ...] submit a risk prediction (missing fields use defaults)
  /analyze <file.pdf>     analyze a medical report (PDF, max 10 MB)
  /report                 generate a health report
  /history                show your saved records
  /new                    start a new chat
  /health                 check the connection
  /quit                   exit

Form fields: age, gender, bmi, glucose, blood_pressure, skin_thickness,
insulin, diabetes_pedigree, pregnancies, lifestyle, symptoms
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Chat(String),
    Set(Vec<String>),
    ShowForm,
    Predict(Vec<String>),
    Analyze(Option<String>),
    Report,
    History,
    New,
    Health,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Chat(line.to_string());
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match name.to_ascii_lowercase().as_str() {
        "set" => Command::Set(split_args(args)),
        "form" => Command::ShowForm,
        "predict" => Command::Predict(split_args(args)),
        "analyze" => Command::Analyze(split_args(args).into_iter().next()),
        "report" => Command::Report,
        "history" => Command::History,
        "new" => Command::New,
        "health" => Command::Health,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Applies `key=value` arguments to the form. Returns a complaint for each
/// argument that was not applied.
fn apply_fields(form: &mut PredictionForm, args: &[String]) -> Vec<String> {
    let mut ignored = Vec::new();

    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => {
                if PredictionForm::is_known_field(&key.trim().to_ascii_lowercase()) {
                    form.set(key, value);
                } else {
                    ignored.push(format!("Unknown field '{}'", key));
                }
            }
            None => ignored.push(format!("Ignoring '{}': expected key=value", arg)),
        }
    }

    ignored
}

/// Loads the file named by `/analyze`. `Err` holds the message to show.
async fn load_report(path: Option<&str>) -> Result<Option<ReportFile>, String> {
    let Some(path) = path else {
        return Ok(None);
    };

    read_report(Path::new(path)).await.map(Some).map_err(|e| {
        warn!("Could not read '{}': {}", path, e);
        format!("Could not read '{}': {}", path, e)
    })
}

fn format_entry(entry: &TranscriptEntry) -> String {
    let who = match entry.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    format!("[{}] {}: {}\n", entry.display_time(), who, entry.text)
}

fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("  ({}) {}\n", tag, notice.message)
}

pub struct Console {
    controller: SessionController,
    notices: UnboundedReceiver<Notice>,
    form: PredictionForm,
    shown: usize,
    stdout: Stdout,
}

impl Console {
    pub fn new(controller: SessionController, notices: UnboundedReceiver<Notice>) -> Self {
        Self {
            controller,
            notices,
            form: PredictionForm::default(),
            shown: 0,
            stdout: tokio::io::stdout(),
        }
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.flush().await?;
        Ok(())
    }

    /// Prints transcript entries and notices produced since the last call.
    async fn flush(&mut self) -> Result<()> {
        let transcript = self.controller.transcript();
        if transcript.len() < self.shown {
            self.shown = 0;
        }

        let mut out: String = transcript.entries()[self.shown..]
            .iter()
            .filter(|e| e.role == Role::Assistant)
            .map(format_entry)
            .collect();
        self.shown = transcript.len();

        while let Ok(notice) = self.notices.try_recv() {
            out.push_str(&format_notice(&notice));
        }

        if !out.is_empty() {
            self.write(&out).await?;
        }
        Ok(())
    }

    pub async fn run(mut self) -> Result<()> {
        self.write(BANNER).await?;
        self.controller.check_health().await;
        self.flush().await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.write("> ").await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_command(&line) {
                Command::Quit => break,
                command => self.dispatch(command).await?,
            }
            self.flush().await?;
        }

        info!("Console closed");
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Chat(text) => {
                if !text.is_empty() {
                    self.write("  ...\n").await?;
                }
                self.controller.send_message(&text).await;
            }
            Command::Set(args) => {
                let ignored = apply_fields(&mut self.form, &args);
                self.write_lines(&ignored).await?;
            }
            Command::ShowForm => {
                let text = if self.form.is_empty() {
                    "  (form is empty, defaults will be used)\n".to_string()
                } else {
                    self.form
                        .fields()
                        .map(|(k, v)| format!("  {} = {}\n", k, v))
                        .collect()
                };
                self.write(&text).await?;
            }
            Command::Predict(args) => {
                let ignored = apply_fields(&mut self.form, &args);
                self.write_lines(&ignored).await?;
                self.controller.submit_prediction(&mut self.form).await;
            }
            Command::Analyze(path) => match load_report(path.as_deref()).await {
                Ok(file) => self.controller.analyze_report(file).await,
                Err(message) => self.write(&format!("  (error) {}\n", message)).await?,
            },
            Command::Report => self.controller.generate_report().await,
            Command::History => self.controller.history_overview().await,
            Command::New => {
                self.controller.new_session().await;
                self.form.clear();
            }
            Command::Health => {
                self.controller.check_health().await;
                if let Some(user) = self.controller.user() {
                    let line = format!("  Signed in as {} (#{})\n", user.name, user.id);
                    self.write(&line).await?;
                }
            }
            Command::Help => self.write(HELP).await?,
            Command::Unknown(name) => {
                self.write(&format!("  Unknown command '/{}'. Try /help.\n", name))
                    .await?
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.write(&format!("  {}\n", line)).await?;
        }
        Ok(())
    }
}
