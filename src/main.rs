use clap::{Arg, Command};
use comlib_translate::http::Params;
use comlib_translate::mt::{
    BaseUrlType, CanonicalResult, GoogleTranslateProvider, GoogleWebProvider,
    MicrosoftTranslatorProvider, Translator,
};
use tracing_subscriber::EnvFilter;

/// Parameter names each provider uses for source and target language
///
/// Without a source the provider's own default applies.
fn language_params(provider: &str, source: Option<&str>, target: &str) -> Params {
    let (source_key, target_key) = match provider {
        "google" => ("sl", "tl"),
        "google-v2" => ("source", "target"),
        _ => ("from", "to"),
    };
    let mut params = Params::new().with(target_key, target);
    if let Some(source) = source {
        params.insert(source_key, source);
    }
    params
}

fn build_translator(
    provider: &str,
    key: Option<&String>,
    host: Option<&String>,
) -> Result<Box<dyn Translator>, Box<dyn std::error::Error>> {
    if host.is_some() && provider != "google" {
        return Err(format!("--host only applies to the google provider, not {}", provider).into());
    }

    let translator: Box<dyn Translator> = match provider {
        "google" => {
            let mut web = GoogleWebProvider::from_env()?;
            if let Some(key) = key {
                web.set_api_key(key.clone());
            }
            if let Some(host) = host {
                web.set_base_url_type(host.parse::<BaseUrlType>()?);
            }
            Box::new(web)
        }
        "google-v2" => match key {
            Some(key) => Box::new(GoogleTranslateProvider::new(key.clone())?),
            None => Box::new(GoogleTranslateProvider::from_env()?),
        },
        _ => match key {
            Some(key) => Box::new(MicrosoftTranslatorProvider::new(key.clone())?),
            None => Box::new(MicrosoftTranslatorProvider::from_env()?),
        },
    };
    Ok(translator)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("comlib-translate")
        .version("0.1.0")
        .about("Translate text with Google or Microsoft machine translation")
        .arg(
            Arg::new("text")
                .help("Text to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .short('p')
                .help("Translation service to use")
                .value_parser(["google", "google-v2", "microsoft"])
                .default_value("google"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Source language code (default: provider specific)"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .help("Target language code (default: en)")
                .default_value("en"),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .short('k')
                .help("API or subscription key (default: read from the environment)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Google web host variant (google provider only)")
                .value_parser(["en", "cn"]),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the full result as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log request details")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let text = matches.get_one::<String>("text").ok_or("missing text")?;
    let provider = matches
        .get_one::<String>("provider")
        .map(String::as_str)
        .unwrap_or("google");
    let source = matches.get_one::<String>("source").map(String::as_str);
    let target = matches
        .get_one::<String>("target")
        .map(String::as_str)
        .unwrap_or("en");

    let translator = build_translator(
        provider,
        matches.get_one::<String>("key"),
        matches.get_one::<String>("host"),
    )?;
    let params = language_params(provider, source, target);

    let result = translator.translate(text, &params).await?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        CanonicalResult::Translated { text, .. } => println!("{}", text),
        CanonicalResult::Failed { code, message } => {
            eprintln!("❌ {} error {}: {}", translator.provider_name(), code, message);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_params_use_provider_names() {
        let params = language_params("google", Some("zh-CN"), "en");
        assert_eq!(params.get_str("sl"), Some("zh-CN"));
        assert_eq!(params.get_str("tl"), Some("en"));

        let params = language_params("microsoft", None, "fr");
        assert_eq!(params.get_str("to"), Some("fr"));
        assert!(!params.contains_key("from"));
    }

    #[test]
    fn test_host_rejected_for_other_providers() {
        let key = "test-key".to_string();
        let host = "cn".to_string();
        for provider in ["google-v2", "microsoft"] {
            let result = build_translator(provider, Some(&key), Some(&host));
            assert!(result.is_err(), "{} accepted --host", provider);
        }
    }

    #[test]
    fn test_host_selects_google_variant() {
        let key = "test-key".to_string();
        let host = "cn".to_string();
        let translator = build_translator("google", Some(&key), Some(&host)).unwrap();
        assert_eq!(translator.provider_name(), "Google Web Translate");
    }
}
