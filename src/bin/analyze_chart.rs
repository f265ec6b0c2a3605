use anyhow::{Context, Result};
use chart_vision::bitmap::Bitmap;
use chart_vision::config::{ConfigFormat, PipelineConfig};
use chart_vision::model::SignalDirection;
use chart_vision::validator::{M1ContextInput, M1ContextValidator};
use chart_vision::vision::ChartExtractor;
use log::{debug, error, info, warn};
use std::env;
use std::path::Path;

fn print_usage(program: &str) {
    println!("사용법: {} <이미지_경로> [buy|sell|neutral] [설정_파일_경로]", program);
    println!("지원되는 이미지 형식: png, jpeg");
    println!("설정 파일 형식: toml, json");
}

fn load_bitmap(path: &Path) -> Result<Bitmap> {
    let image = image::open(path)
        .with_context(|| format!("이미지 디코딩 실패: {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    debug!("이미지 로드: {}x{}", width, height);

    Bitmap::new(width as usize, height as usize, image.into_raw())
        .context("RGBA 버퍼 변환 실패")
}

fn load_config(path: Option<&str>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        debug!("기본 설정 사용");
        return Ok(PipelineConfig::default());
    };

    let path = Path::new(path);
    if !path.exists() {
        warn!("설정 파일이 존재하지 않습니다: {}", path.display());
        println!("경고: 설정 파일이 존재하지 않아 기본 설정을 사용합니다: {}", path.display());
        return Ok(PipelineConfig::default());
    }

    PipelineConfig::load_from_file(path, ConfigFormat::Auto)
        .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))
}

fn run(args: &[String]) -> Result<()> {
    let image_path = Path::new(&args[1]);
    let signal = match args.get(2) {
        Some(raw) => raw
            .parse::<SignalDirection>()
            .map_err(anyhow::Error::msg)
            .context("신호 방향 파싱 실패")?,
        None => SignalDirection::Neutral,
    };
    let config = load_config(args.get(3).map(String::as_str))?;

    info!("차트 분석 시작: {} (신호 {})", image_path.display(), signal);
    let bitmap = load_bitmap(image_path)?;

    let extractor = ChartExtractor::new(config.clone());
    let extraction = extractor
        .extract(&bitmap)
        .with_context(|| format!("차트 추출 실패: {}", image_path.display()))?;

    println!("{}", serde_json::to_string_pretty(&extraction)?);
    for warning in &extraction.warnings {
        println!("경고: {}", warning);
    }

    if signal == SignalDirection::Neutral {
        info!("신호가 없어 진입 검증을 생략합니다");
        return Ok(());
    }

    let validator = M1ContextValidator::new(config.validator);
    let input =
        M1ContextInput::new(&extraction.candles, signal).with_levels(&extraction.levels);
    let validation = validator.validate(&input);

    println!("{}", serde_json::to_string_pretty(&validation)?);
    println!("{}", validation);
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 이미지 경로가 필요합니다.");
        print_usage(args.first().map(String::as_str).unwrap_or("analyze_chart"));
        std::process::exit(2);
    }

    if let Err(err) = run(&args) {
        error!("차트 분석 실패: {:#}", err);
        println!("차트 분석 실패: {:#}", err);
        std::process::exit(1);
    }

    info!("차트 분석 종료");
}
