use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use facelink_client::HttpClient;
use facelink_core::auth::{LoginForm, LoginMessage, RegisterForm, RegisterMessage};
use facelink_core::dashboard::{
    CompareMessage, CreateMessage, ListState, ManageMessage, Message,
};
use facelink_core::{Dashboard, Feedback, ImageFile, Status, Tab};
use facelink_hw::capture::{CaptureOptions, StreamConstraints};
use facelink_hw::{Camera, CaptureWidget, FileAcquisition, PreviewStore, V4lSource};
use std::convert::Infallible;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "facelink", about = "Face embedding dashboard CLI")]
struct Cli {
    /// Backend base URL (overrides config and FACELINK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// An image path, or `camera` to take a photo.
#[derive(Debug, Clone)]
enum ImageArg {
    Camera,
    Path(PathBuf),
}

impl FromStr for ImageArg {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "camera" {
            ImageArg::Camera
        } else {
            ImageArg::Path(PathBuf::from(s))
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password (defaults to --password)
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create a face embedding for a person
    Enroll {
        /// Person name to store the embedding under
        #[arg(short, long)]
        name: String,
        /// Image path, or "camera"
        image: ImageArg,
    },
    /// Compare two faces (exit status 0 on match)
    Compare {
        /// First image path, or "camera"
        first: ImageArg,
        /// Second image path, or "camera"
        second: ImageArg,
    },
    /// Delete a person's embedding
    Delete {
        /// Person name to delete
        name: String,
    },
    /// Rename a person's embedding
    Rename {
        name: String,
        new_name: String,
    },
    /// List stored embeddings
    List,
    /// Take a photo with the camera and save it
    Capture {
        #[arg(short, long, default_value = "camera-capture.jpg")]
        output: PathBuf,
    },
    /// List V4L2 capture devices
    Devices,
}

fn capture_options(config: &Config) -> CaptureOptions {
    CaptureOptions {
        constraints: StreamConstraints {
            ideal_width: config.capture_width,
            ideal_height: config.capture_height,
            ..StreamConstraints::default()
        },
        jpeg_quality: config.jpeg_quality,
    }
}

fn camera_source(config: &Config) -> V4lSource {
    V4lSource::new(config.camera_device.clone(), config.warmup_frames)
}

/// Run one acquisition (picker or camera) and return the selected file.
async fn acquire(image: &ImageArg, config: &Config) -> Result<ImageFile> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut acquisition = FileAcquisition::new(
        camera_source(config),
        PreviewStore::new(),
        move |file: &ImageFile| {
            let _ = tx.send(file.clone());
        },
    )
    .with_capture_options(capture_options(config));

    match image {
        ImageArg::Path(path) => {
            if !acquisition.pick(vec![path.clone()])? {
                bail!(
                    "{} is not an accepted image type ({})",
                    path.display(),
                    acquisition.picker().accept()
                );
            }
        }
        ImageArg::Camera => {
            let camera = acquisition.open_camera();
            camera.start_camera().await?;
            if let Some(error) = camera.error().map(str::to_string) {
                acquisition.close_camera();
                bail!(error);
            }
            acquisition.capture_from_overlay()?;
        }
    }

    rx.try_recv().map_err(|_| anyhow!("no image selected"))
}

fn report(status: &Status<Feedback>) -> ExitCode {
    match status {
        Status::Done(Feedback::Success(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Status::Done(Feedback::Error(text)) => {
            eprintln!("{text}");
            ExitCode::FAILURE
        }
        Status::Idle | Status::Loading => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    tracing::debug!(?config, "configuration loaded");

    let client = HttpClient::new(&config.api_url)?;

    let code = match cli.command {
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let mut form = RegisterForm::default();
            let confirm = confirm_password.unwrap_or_else(|| password.clone());
            form.handle(RegisterMessage::UsernameChanged(username));
            form.handle(RegisterMessage::EmailChanged(email));
            form.handle(RegisterMessage::PasswordChanged(password));
            form.handle(RegisterMessage::ConfirmChanged(confirm));
            form.submit(&client).await;
            report(form.status())
        }
        Commands::Login { email, password } => {
            let mut form = LoginForm::default();
            form.handle(LoginMessage::EmailChanged(email));
            form.handle(LoginMessage::PasswordChanged(password));
            form.submit(&client).await;
            let code = report(form.status());
            if let Some(user) = form.user() {
                println!("{}", serde_json::to_string_pretty(user)?);
            }
            code
        }
        Commands::Enroll { name, image } => {
            let file = acquire(&image, &config).await?;
            let mut dash = Dashboard::new(client);
            dash.update(Message::Create(CreateMessage::NameChanged(name)))
                .await;
            dash.update(Message::Create(CreateMessage::FileSelected(Some(file))))
                .await;
            dash.update(Message::Create(CreateMessage::Submit)).await;
            report(dash.create.status())
        }
        Commands::Compare { first, second } => {
            let first = acquire(&first, &config).await?;
            let second = acquire(&second, &config).await?;
            let mut dash = Dashboard::new(client);
            dash.select_tab(Tab::Compare).await;
            dash.update(Message::Compare(CompareMessage::FirstSelected(Some(first))))
                .await;
            dash.update(Message::Compare(CompareMessage::SecondSelected(Some(second))))
                .await;
            dash.update(Message::Compare(CompareMessage::Submit)).await;

            match dash.compare.status().result() {
                Some(result) => {
                    for line in result.render_lines() {
                        println!("{line}");
                    }
                    if result.is_match {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                None => ExitCode::FAILURE,
            }
        }
        Commands::Delete { name } => {
            let mut dash = Dashboard::new(client);
            dash.select_tab(Tab::Manage).await;
            dash.update(Message::Manage(ManageMessage::NameChanged(name)))
                .await;
            dash.update(Message::Manage(ManageMessage::Delete)).await;
            report(dash.manage.status())
        }
        Commands::Rename { name, new_name } => {
            let mut dash = Dashboard::new(client);
            dash.select_tab(Tab::Manage).await;
            dash.update(Message::Manage(ManageMessage::NameChanged(name)))
                .await;
            dash.update(Message::Manage(ManageMessage::NewNameChanged(new_name)))
                .await;
            dash.update(Message::Manage(ManageMessage::Rename)).await;
            report(dash.manage.status())
        }
        Commands::List => {
            let mut dash = Dashboard::new(client);
            dash.select_tab(Tab::List).await;
            let failed = matches!(dash.list.state(), ListState::Failed(_));
            for line in dash.list.render_lines() {
                if failed {
                    eprintln!("{line}");
                } else {
                    println!("{line}");
                }
            }
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Commands::Capture { output } => {
            let previews = PreviewStore::new();
            let mut widget =
                CaptureWidget::new(camera_source(&config), previews, capture_options(&config));
            widget.start_camera().await?;
            if let Some(error) = widget.error() {
                eprintln!("{error}");
                widget.close();
                return Ok(ExitCode::FAILURE);
            }
            let meta = widget.metadata();
            let file = widget.capture_photo()?;
            std::fs::write(&output, &file.bytes)?;
            if let Some(url) = widget.preview_url() {
                tracing::debug!(url, "preview available");
            }
            match meta {
                Some(meta) => println!(
                    "Saved {} ({}x{}, {} bytes)",
                    output.display(),
                    meta.width,
                    meta.height,
                    file.len()
                ),
                None => println!("Saved {} ({} bytes)", output.display(), file.len()),
            }
            widget.close();
            ExitCode::SUCCESS
        }
        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("No capture devices found");
            }
            for dev in devices {
                println!("{}\t{} ({}, {})", dev.path, dev.name, dev.driver, dev.bus);
            }
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
