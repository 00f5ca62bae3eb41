//! CLI command handlers

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration
};

use anyhow::{Context, Result, bail};
use indicatif::MultiProgress;

use super::{
    LangCommands,
    demo::{self, ABOUT_KEY, AboutViewModel, Pipeline}
};
use crate::{
    command::OpenFileCommand,
    context::AppContext,
    converter::{ConverterRegistry, Value},
    domain::{outcome::ExecutionOutcome, parameter::Parameter},
    i18n::{Language, Localizer},
    navigation::HistoryFrame,
    port::{
        command::Invocable,
        converter::ConvertBack,
        frame::Page
    },
    ui::{PromptFilePicker, progress}
};

/// Localized description of an outcome
pub fn describe_outcome(localizer: &Localizer, outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Completed => localizer.lookup("outcome_completed"),
        ExecutionOutcome::Cancelled => localizer.lookup("outcome_cancelled"),
        ExecutionOutcome::Failed(err) => localizer.lookup_params("outcome_failed", &[&err.to_string()])
    }
}

/// Handle the init command - initialize configuration directories
pub async fn handle_init_command(context: &AppContext) -> Result<()> {
    println!("{}", context.t("init_initializing"));

    context.config.init_dirs().context("Failed to initialize configuration directories")?;

    println!("{}", context.t("init_success"));
    println!("{}", context.t_params("init_config_dir", &[&context.config.config_dir().display().to_string()]));
    println!("{}", context.t_params("init_i18n_dir", &[&context.config.i18n_dir().display().to_string()]));
    Ok(())
}

/// Handle language commands
pub async fn handle_lang_command(context: &AppContext, command: &LangCommands) -> Result<()> {
    match command {
        LangCommands::Set { language } => {
            let available = context.config.list_available_languages().context("Failed to list available languages")?;
            let codes = available.iter().map(Language::code).collect::<Vec<_>>().join(", ");

            let Some(selected) = language.parse::<Language>().ok().filter(|lang| available.contains(lang)) else {
                bail!(context.t_params("lang_unknown_language", &[language.as_str(), &codes]));
            };

            context.config.set_language(selected).context("Failed to set language")?;
            context.localizer.set_language(selected);

            println!("{}", context.t_params("lang_set_success", &[selected.native_name()]));
        }
        LangCommands::List => {
            let languages = context.config.list_available_languages().context("Failed to list available languages")?;
            let current = context.localizer.language();

            println!("{}", context.t("lang_available_header"));
            for lang in languages {
                let marker = if lang == current { context.t("lang_current_marker") } else { String::new() };
                println!("  • {} ({}){}", lang.native_name(), lang.code(), marker);
            }
        }
        LangCommands::Current => {
            let current = context.localizer.language();
            println!("{}", context.t_params("lang_current", &[&format!("{} ({})", current.native_name(), current.code())]));
        }
    }

    Ok(())
}

/// Handle the run command - run the demo pipeline with live progress
pub async fn handle_run_command(context: &AppContext, steps: u32, delay_ms: u64, fail: bool) -> Result<()> {
    let pipeline = Arc::new(Pipeline::new(steps, Duration::from_millis(delay_ms), fail));

    let interrupted = pipeline.clone();
    ctrlc::set_handler(move || interrupted.cancel()).context("Failed to install the Ctrl-C handler")?;

    let parameter = Parameter::new(steps);
    if !pipeline.all.can_execute(&parameter)? {
        bail!(context.t("run_not_ready"));
    }
    println!("{}", context.t_params("run_starting", &[&pipeline.all.len().to_string()]));

    let multi = MultiProgress::new();
    for (command, label) in [(&pipeline.sync, "run_sync"), (&pipeline.index, "run_index")] {
        let label = context.t(label);
        let spinner = progress::create_spinner(&multi, &label);
        let localizer = context.localizer.clone();
        command.completed().subscribe(move |outcome| {
            spinner.finish_with_message(format!("{}: {}", label, describe_outcome(&localizer, outcome)));
        });
    }

    let bar = progress::create_percent_bar(&multi, &context.t("run_import"));
    let reported = bar.clone();
    pipeline.import.progress_changed().subscribe(move |percent: &i32| {
        reported.set_position(progress::bar_position(*percent));
    });
    let finished = bar.clone();
    pipeline.import.completed().subscribe(move |_| finished.finish());

    let outcome = pipeline.all.execute_and_wait(&parameter).await?;

    println!("{}", context.t_params("run_summary", &[&describe_outcome(&context.localizer, &outcome)]));
    if let Some(err) = outcome.error() {
        bail!(context.t_params("run_failed", &[&err.to_string()]));
    }
    Ok(())
}

/// Render a converted value for the terminal
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Text(text) => format!("\"{}\"", text),
        other => other.to_string()
    }
}

/// Options of the convert command
pub struct ConvertRequest<'a> {
    pub name:   Option<&'a str>,
    pub values: &'a [String],
    pub param:  Option<&'a str>,
    pub file:   Option<&'a Path>,
    pub back:   bool,
    pub list:   bool
}

fn load_registry(context: &AppContext, file: Option<&Path>) -> Result<ConverterRegistry> {
    let mut registry = ConverterRegistry::defaults();

    let path: Option<PathBuf> = match file {
        Some(file) => Some(file.to_path_buf()),
        None => Some(context.config.converters_file_path()).filter(|path| path.exists())
    };
    if let Some(path) = path {
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read converter file: {}", path.display()))?;
        let declared = registry.load_yaml(&content)?;
        println!("{}", context.t_params("convert_loaded", &[&declared.to_string(), &path.display().to_string()]));
    }
    Ok(registry)
}

/// Handle the convert command
pub fn handle_convert_command(context: &AppContext, request: ConvertRequest<'_>) -> Result<()> {
    let registry = load_registry(context, request.file)?;

    if request.list {
        println!("{}", context.t("convert_available_header"));
        for name in registry.names() {
            let kind = registry.get(name)?.kind();
            if kind == name {
                println!("  • {}", name);
            } else {
                println!("  • {} ({})", name, kind);
            }
        }
        return Ok(());
    }

    let Some(name) = request.name else {
        bail!(context.t("convert_missing_name"));
    };
    let values: Vec<Value> = request.values.iter().map(|value| Value::parse(value)).collect();
    let parameter = request.param.map(Value::parse);
    let culture = context.localizer.language();

    if request.back {
        let value = values.first().cloned().unwrap_or(Value::Null);
        match registry.convert_back(name, &value, parameter.as_ref(), culture)? {
            ConvertBack::Value(value) => println!("{}", context.t_params("convert_result", &[&display_value(&value)])),
            ConvertBack::NoChange => println!("{}", context.t("convert_no_change"))
        }
        return Ok(());
    }

    let converted = match values.as_slice() {
        [] => registry.convert(name, &Value::Null, parameter.as_ref(), culture)?,
        [value] => registry.convert(name, value, parameter.as_ref(), culture)?,
        many => registry.convert_many(name, many, parameter.as_ref(), culture)?
    };
    println!("{}", context.t_params("convert_result", &[&display_value(&converted)]));
    Ok(())
}

/// Handle the open command - pick a file through the terminal picker
pub async fn handle_open_command(context: &AppContext) -> Result<()> {
    let picker = Arc::new(PromptFilePicker::new(context.t("open_prompt")));
    let localizer = context.localizer.clone();
    let command = OpenFileCommand::new(picker, move |path| {
        let size = fs::metadata(&path).map(|metadata| metadata.len()).unwrap_or_default();
        println!("{}", localizer.lookup_params("open_selected", &[&path.display().to_string(), &size.to_string()]));
    });

    if command.open()?.is_cancelled() {
        println!("{}", context.t("open_dismissed"));
    }
    Ok(())
}

/// Handle the navigate command - walk the demo routes on an in-memory frame
pub fn handle_navigate_command(context: &AppContext, keys: &[String], back: u32) -> Result<()> {
    let navigation = &context.navigation;
    demo::configure_routes(navigation);

    if keys.is_empty() {
        let mut routes = navigation.keys();
        routes.push(ABOUT_KEY.to_string());
        println!("{}", context.t_params("navigate_routes", &[&routes.join(", ")]));
        return Ok(());
    }

    let frame = Arc::new(HistoryFrame::new());
    let localizer = context.localizer.clone();
    frame.navigated().subscribe(move |page: &Page| {
        println!("{}", localizer.lookup_params("navigate_showing", &[&page.view]));
    });
    navigation.set_frame(frame);

    for key in keys {
        if key == ABOUT_KEY {
            navigation.navigate_to_view_model::<AboutViewModel>(Parameter::none())?;
        } else {
            navigation.navigate_to(key, Parameter::none())?;
        }
    }

    for _ in 0..back {
        if !navigation.go_back() {
            println!("{}", context.t("navigate_no_history"));
            break;
        }
    }
    Ok(())
}
