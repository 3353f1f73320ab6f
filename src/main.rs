use clap::Parser;
use qsine::adapters::{FileCamera, HttpBackend, HttpTranslator, LocalStorage};
use qsine::app::flows::text_flow::DEFAULT_LANGUAGE;
use qsine::app::flows::{
    BarcodeDetail, BarcodeFlow, BarcodeOutcome, ImageFlow, SettingsFlow, TextAnalysis,
    TextConfirmation, TextFlow,
};
use qsine::config::{AllergenCommand, AppConfig, CliConfig, Command};
use qsine::core::capture::CaptureSession;
use qsine::core::matcher::display_name;
use qsine::core::profile::{ProfileState, ProfileStore};
use qsine::core::{ConfigProvider, Route};
use qsine::domain::model::{Product, UserAllergenProfile};
use qsine::utils::error::QsineError;
use qsine::utils::{logger, validation::Validate};
use qsine::ScreenScope;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(cli.verbose, config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());
    }

    tracing::info!("Starting qsine CLI");
    tracing::debug!("Backend: {}", config.api_base_url());

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let scope = ScreenScope::new("cli");
    let token = scope.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling outstanding requests");
            token.cancel();
        }
    });

    if let Err(e) = run(cli.command, &config, &scope).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: &AppConfig, scope: &ScreenScope) -> qsine::Result<()> {
    let backend = HttpBackend::from_config(config)?;
    let store = ProfileStore::new(LocalStorage::new(config.data_dir()));

    match command {
        Command::Allergens { action } => {
            let state = ProfileState::load(store).await;
            run_allergens(action, SettingsFlow::new(backend, state), scope).await
        }
        Command::Barcode { code } => {
            let profile = store.load().await;
            open_barcode(&BarcodeFlow::new(backend), scope, &code, &profile).await
        }
        Command::EditProduct {
            code,
            name,
            company,
            ingredients_file,
        } => {
            let flow = BarcodeFlow::new(backend);
            let profile = store.load().await;
            let mut product = match flow.open(scope, &code, &profile).await? {
                BarcodeOutcome::Detail(detail) => detail.product,
                BarcodeOutcome::ManualEntry(_) => {
                    return Err(QsineError::not_found("Product not found"));
                }
            };

            if let Some(name) = name {
                product.name = name;
            }
            if let Some(company) = company {
                product.company = company;
            }
            if let Some(path) = ingredients_file {
                let text = tokio::fs::read_to_string(&path).await?;
                product.set_ingredients_from_text(&text);
            }

            flow.save_edit(scope, &code, &product).await?;
            println!("✅ Saved changes to {}", code);
            Ok(())
        }
        Command::AddProduct {
            code,
            name,
            company,
            ingredients,
        } => {
            let product = BarcodeFlow::new(backend)
                .submit_manual(scope, &code, &name, &company, &ingredients)
                .await?;
            println!("✅ Submitted {} ({} ingredients)", product.name, product.ingredients.len());
            Ok(())
        }
        Command::Capture {
            mode,
            image,
            barcode,
            language,
        } => {
            let mut session = CaptureSession::new(FileCamera::new(image), mode);
            let route = match barcode {
                Some(value) => session.on_barcode_scanned(&value)?,
                None => Some(session.press_shutter().await?),
            };
            let Some(route) = route else {
                return Ok(());
            };
            println!("➡️  {}", serde_json::to_string(&route)?);

            let profile = store.load().await;
            match route {
                Route::BarcodeDetail { barcode } => {
                    open_barcode(&BarcodeFlow::new(backend), scope, &barcode, &profile).await
                }
                Route::ImageAnalysis { uri } => {
                    let next = ImageFlow::new(backend).submit(scope, &uri, None).await?;
                    print_image_result(&next);
                    Ok(())
                }
                Route::TextAnalysis { uri } => {
                    let flow = TextFlow::new(backend, translator(config));
                    let confirm = flow.submit_image(scope, &uri, &language).await?;
                    run_text(&flow, scope, confirm, None, &profile).await
                }
                _ => Ok(()),
            }
        }
        Command::Image { path, metadata } => {
            let metadata = metadata
                .as_deref()
                .map(serde_json::from_str::<serde_json::Value>)
                .transpose()?;
            let uri = path.to_string_lossy();
            let next = ImageFlow::new(backend)
                .submit(scope, &uri, metadata.as_ref())
                .await?;
            print_image_result(&next);
            Ok(())
        }
        Command::Text {
            path,
            language,
            select,
        } => {
            let profile = store.load().await;
            let flow = TextFlow::new(backend, translator(config));
            let confirm = flow
                .submit_image(scope, &path.to_string_lossy(), &language)
                .await?;
            run_text(&flow, scope, confirm, select, &profile).await
        }
        Command::ClassifyText { text, select } => {
            let profile = store.load().await;
            let flow = TextFlow::new(backend, translator(config));
            let confirm = Route::TextConfirm {
                text,
                language: DEFAULT_LANGUAGE.to_string(),
                manual: true,
            };
            run_text(&flow, scope, confirm, select, &profile).await
        }
        Command::Translate { text, language } => {
            let flow = TextFlow::new(backend, Some(HttpTranslator::from_config(config)?));
            let mut confirmation = TextConfirmation::new(&text, &language, false);
            flow.translate(scope, &mut confirmation).await?;
            println!("{}", confirmation.translated().unwrap_or_default());
            Ok(())
        }
    }
}

fn translator(config: &AppConfig) -> Option<HttpTranslator> {
    match HttpTranslator::from_config(config) {
        Ok(translator) => Some(translator),
        Err(e) => {
            tracing::debug!("Translation disabled: {}", e);
            None
        }
    }
}

async fn run_allergens(
    action: AllergenCommand,
    mut flow: SettingsFlow<HttpBackend, LocalStorage>,
    scope: &ScreenScope,
) -> qsine::Result<()> {
    match action {
        AllergenCommand::List => print_profile(flow.profile()),
        AllergenCommand::Catalogue { query } => {
            flow.load_catalogue(scope).await?;
            for allergen in flow.visible(&query) {
                let mark = if flow.is_selected(&allergen.id) { "●" } else { "○" };
                println!("{} {} ({})", mark, display_name(&allergen.name), allergen.id);
            }
        }
        AllergenCommand::Toggle { id } => print_profile(flow.toggle(&id).await),
        AllergenCommand::Set { ids } => print_profile(flow.set(ids).await),
        AllergenCommand::Clear => print_profile(flow.clear().await),
    }
    Ok(())
}

async fn open_barcode(
    flow: &BarcodeFlow<HttpBackend>,
    scope: &ScreenScope,
    barcode: &str,
    profile: &UserAllergenProfile,
) -> qsine::Result<()> {
    match flow.open(scope, barcode, profile).await? {
        BarcodeOutcome::Detail(detail) => print_barcode_detail(&detail),
        BarcodeOutcome::ManualEntry(route) => {
            println!("Product not found");
            println!(
                "➡️  {} (use `qsine add-product {}` to enter it manually)",
                route.screen(),
                barcode
            );
        }
    }
    Ok(())
}

async fn run_text(
    flow: &TextFlow<HttpBackend, HttpTranslator>,
    scope: &ScreenScope,
    confirm: Route,
    select: Option<usize>,
    profile: &UserAllergenProfile,
) -> qsine::Result<()> {
    let Some(mut confirmation) = TextConfirmation::from_route(&confirm) else {
        return Ok(());
    };
    println!("Extracted text:\n{}\n", confirmation.edited);

    if confirmation.needs_auto_translation() {
        match flow.translate(scope, &mut confirmation).await {
            Ok(()) => println!(
                "Translated text:\n{}\n",
                confirmation.translated().unwrap_or_default()
            ),
            Err(QsineError::Cancelled) => return Err(QsineError::Cancelled),
            Err(e) => eprintln!("⚠️  {}", e.user_friendly_message()),
        }
    }

    let Route::TextResults { confirmed_text } = confirmation.confirm()? else {
        return Ok(());
    };
    let mut analysis = flow.classify(scope, &confirmed_text).await?;
    if let Some(index) = select {
        flow.select(scope, &mut analysis, index).await?;
    }
    print_text_analysis(&analysis, profile);
    Ok(())
}

fn print_profile(profile: &UserAllergenProfile) {
    if profile.is_empty() {
        println!("No allergens selected");
        return;
    }
    for id in profile.ids() {
        println!("• {}", id);
    }
}

fn print_allergens(matching: &[String], other: &[String]) {
    println!("\nAllergens");
    if matching.is_empty() {
        println!("  No allergens that match your profile");
    } else {
        println!("  Your Allergens");
        for allergen in matching {
            println!("  ⚠️  {}", display_name(allergen));
        }
    }
    if other.is_empty() {
        println!("  No other allergens found");
    } else {
        println!("  Other Allergens");
        for allergen in other {
            println!("  ·  {}", display_name(allergen));
        }
    }
}

fn print_product(product: &Product) {
    println!("{}", product.name);
    println!("{}", product.company);
}

fn print_barcode_detail(detail: &BarcodeDetail) {
    print_product(&detail.product);
    print_allergens(&detail.allergens.matching, &detail.allergens.other);
    println!("\nIngredients");
    for ingredient in &detail.product.ingredients {
        println!("  • {}", ingredient);
    }
}

fn print_image_result(route: &Route) {
    if let Route::ImageResults { classification } = route {
        println!(
            "{} (Confidence: {})",
            qsine::domain::model::capitalize_first(&classification.label),
            classification.display_confidence()
        );
    }
}

fn print_text_analysis(analysis: &TextAnalysis, profile: &UserAllergenProfile) {
    println!("{}", analysis.title());
    if let Some(item) = analysis.selected_item() {
        println!("Confidence Score: {}", item.display_confidence());
    }
    if analysis.items.len() > 1 {
        println!("\nOther Possible Classifications");
        for (index, item) in analysis.items.iter().enumerate() {
            let mark = if index == analysis.selected { "*" } else { " " };
            println!(
                " {} [{}] {} {}",
                mark,
                index,
                qsine::domain::model::capitalize_first(&item.name),
                item.display_confidence()
            );
        }
    }

    let allergens = analysis.allergen_match(profile);
    print_allergens(&allergens.matching, &allergens.other);

    if !analysis.recipe.ingredients.is_empty() {
        println!("\nIngredients");
        for ingredient in &analysis.recipe.ingredients {
            println!("  • {}", ingredient);
        }
    }
    if !analysis.recipe.steps.is_empty() {
        println!("\nSteps");
        for (index, step) in analysis.recipe.steps.iter().enumerate() {
            println!("  {}. {}", index + 1, step);
        }
    }
}
