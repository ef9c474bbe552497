use clap::{Parser, Subcommand};
use rak_site::catalog::Category;
use rak_site::config;
use rak_site::dom::Document;
use rak_site::forms::{self, FileUpload, Form, FormKind, HttpTransport};
use rak_site::gallery::{GalleryError, GalleryView, NavigationState};
use rak_site::generate;
use rak_site::locale::{FileStorage, Locale, LocaleStore};
use rak_site::output;
use rak_site::timers::Timers;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rak-site")]
#[command(about = "Behavior layer for the Rafic A. Kreidie Engineers & Contractors portfolio")]
#[command(long_about = "\
Behavior layer for the Rafic A. Kreidie Engineers & Contractors portfolio

Browse the bilingual project catalog, switch the persisted language, submit
the contact and career forms to the site API, and render the gallery to
static pages.

Gallery navigation:

  Categories                       rak-site browse
  └── Medical                      rak-site browse medical
      └── Juffali Medical Center   rak-site browse medical 3

Project numbers are 1-based, as shown in the listings.

Run 'rak-site gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Directory for persisted client state (the active language)
    #[arg(long, default_value = ".rak-site", global = true)]
    state_dir: PathBuf,

    /// Language for this invocation only; defaults to the persisted one
    #[arg(long, global = true)]
    lang: Option<Locale>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every category and project in the catalog
    Catalog,
    /// Show one gallery state: categories, a category's projects, or a project
    Browse {
        /// Category key, e.g. "medical"
        category: Option<String>,
        /// 1-based project number within the category
        project: Option<usize>,
    },
    /// Show the active language, or set and persist a new one
    Lang {
        /// "ar" or "en"
        code: Option<String>,
    },
    /// Send the contact form to the site API
    Contact {
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Send a job application, with an optional CV file
    Career {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        position: Option<String>,
        /// CV to upload (pdf, doc or docx)
        #[arg(long)]
        cv: Option<PathBuf>,
    },
    /// Render every gallery state to static HTML pages
    Generate {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        /// Prefix prepended to image sources
        #[arg(long, default_value = "/images/")]
        image_base: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.config)?;
    let mut store = LocaleStore::load(
        Box::new(FileStorage::new(cli.state_dir.join("storage.json"))),
        &site_config.locale,
    );
    let locale = cli.lang.unwrap_or(store.locale());

    match cli.command {
        Command::Catalog => output::print_catalog(locale),
        Command::Browse { category, project } => {
            let state = resolve_state(category.as_deref(), project)?;
            output::print_view(&GalleryView::build(state, locale));
        }
        Command::Lang { code } => {
            if let Some(code) = code {
                store.set_locale_str(&code, &mut Document::new())?;
            }
            output::print_locale(store.locale());
        }
        Command::Contact {
            company,
            service,
            name,
            email,
            message,
        } => {
            let fields = [
                ("company_name", company),
                ("services", service),
                ("contact_name", name),
                ("email", email),
                ("message", message),
            ];
            submit(FormKind::Contact, &fields, None, &site_config, locale)?;
        }
        Command::Career {
            name,
            email,
            phone,
            position,
            cv,
        } => {
            let fields = [
                ("full_name", name),
                ("email", email),
                ("phone", phone),
                ("position", position),
            ];
            submit(FormKind::Career, &fields, cv.as_deref(), &site_config, locale)?;
        }
        Command::Generate {
            output: out_dir,
            image_base,
        } => {
            let summary = generate::generate(&out_dir, &Locale::ALL, &image_base)?;
            output::print_generate(&summary);
        }
        // Printed before the config is loaded.
        Command::GenConfig => {}
    }

    Ok(())
}

/// Turn `browse` arguments into a navigation state.
fn resolve_state(
    category: Option<&str>,
    project: Option<usize>,
) -> Result<NavigationState, GalleryError> {
    let Some(key) = category else {
        return Ok(NavigationState::Categories);
    };
    let category: Category = key.parse()?;
    let Some(number) = project else {
        return Ok(NavigationState::Category(category));
    };
    let len = category.projects().len();
    match number.checked_sub(1) {
        Some(index) if index < len => Ok(NavigationState::Project { category, index }),
        _ => Err(GalleryError::InvalidProjectIndex {
            category,
            index: number,
            len,
        }),
    }
}

/// Fill a standalone form with the given values and run its submission flow.
fn submit(
    kind: FormKind,
    values: &[(&str, Option<String>)],
    cv: Option<&Path>,
    site_config: &config::SiteConfig,
    locale: Locale,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = forms::standalone_page(kind);
    let Some(mut form) = Form::bind(&doc, kind, &site_config.forms) else {
        return Err(format!("{kind} form missing from page").into());
    };
    for (name, value) in values {
        if let Some(value) = value {
            form.set_field(&mut doc, name, value);
        }
    }
    if let Some(path) = cv {
        form.attach("cv", FileUpload::from_path(path)?);
    }

    let transport = HttpTransport::new(&site_config.forms)?;
    let outcome = form.submit(&mut doc, &mut Timers::new(), &transport, locale);
    output::print_submit(kind, &outcome, locale);
    if outcome.is_sent() {
        Ok(())
    } else {
        Err(format!("{kind} submission was not sent").into())
    }
}
