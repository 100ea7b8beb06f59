use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ndarray::{Array2, ArrayD, Ix2};

use imagegrid::datasets;
use imagegrid::io::load_array;
use imagegrid::plot::{FilterPlotOptions, filterplot, imgplot};
use imagegrid::theme::Context;
use imagegrid::{
    FilterParams, FilterRef, GridOptions, ImageData, ImageGrid, ImageSource, ImageStyle, Param,
    ParamGrid, ParamGridOptions, ParamValue, StackSlicing, Theme,
};

#[derive(Parser, Debug)]
#[command(
    name = "imagegrid",
    about = "Render images, image stacks and filter sweeps as styled PNG figures",
    version
)]
struct Cli {
    /// JSON theme overrides
    #[arg(long, global = true)]
    theme: Option<PathBuf>,

    /// paper, notebook, talk or poster
    #[arg(long, global = true)]
    context: Option<String>,

    /// Output resolution
    #[arg(long, global = true)]
    dpi: Option<f64>,

    /// Where the figure is written
    #[arg(short = 'o', long = "output", global = true, default_value = "figure.png")]
    output: PathBuf,

    /// Debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plot a single image
    Show {
        file: PathBuf,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Plot several images, or the slices of one stack, as a grid
    Grid {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        col_wrap: Option<usize>,
        /// Axis to slice a stack along
        #[arg(long, allow_hyphen_values = true)]
        axis: Option<isize>,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        stop: Option<usize>,
        #[arg(long)]
        step: Option<usize>,
        /// One colormap, or a comma separated list with one per image
        #[arg(long)]
        cmap: Option<String>,
        #[arg(long, default_value_t = 3.0)]
        height: f64,
        #[arg(long, default_value_t = 1.0)]
        aspect: f64,
        #[arg(long)]
        robust: bool,
    },
    /// Sweep a filter over one or two keyword arguments
    Sweep {
        file: PathBuf,
        filter: String,
        /// Row sweep, `key=v1,v2,...`
        #[arg(long)]
        row: Option<String>,
        /// Column sweep, `key=v1,v2,...`
        #[arg(long)]
        col: Option<String>,
        /// Shared keyword argument, `key=value`
        #[arg(long = "param")]
        params: Vec<String>,
        #[arg(long)]
        col_wrap: Option<usize>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Show an image next to its filtered version
    Filter {
        file: PathBuf,
        filter: String,
        /// Keyword argument, `key=value`
        #[arg(long = "param")]
        params: Vec<String>,
        /// Add the log FFT magnitude of both images
        #[arg(long)]
        fft: bool,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Download a sample dataset into the local cache
    Fetch { name: String },
}

#[derive(Args, Debug)]
struct StyleArgs {
    #[arg(long)]
    cmap: Option<String>,
    /// Limits from the 2nd and 98th percentiles
    #[arg(long)]
    robust: bool,
    #[arg(long, allow_hyphen_values = true)]
    vmin: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    vmax: Option<f64>,
    /// Pixel size for the scale bar
    #[arg(long)]
    dx: Option<f64>,
    #[arg(long)]
    units: Option<String>,
    #[arg(long)]
    no_cbar: bool,
    #[arg(long)]
    title: Option<String>,
}

impl StyleArgs {
    fn to_style(&self) -> ImageStyle {
        ImageStyle {
            cmap: self.cmap.clone(),
            vmin: self.vmin,
            vmax: self.vmax,
            robust: self.robust,
            dx: self.dx,
            units: self.units.clone(),
            cbar: !self.no_cbar,
            title: self.title.clone(),
            ..Default::default()
        }
    }
}

fn load_2d(path: &Path) -> Result<Array2<f64>, Box<dyn Error>> {
    let array = load_array(path)?;
    let ndim = array.ndim();
    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| format!("{} is not a 2-D image ({ndim} dimensions)", path.display()).into())
}

fn split_assignment(s: &str) -> Result<(&str, &str), Box<dyn Error>> {
    s.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{s}'").into())
}

/// `key=v1,v2` as a swept list; a single value still sweeps one cell.
fn parse_sweep(s: &str) -> Result<(String, ParamValue), Box<dyn Error>> {
    let (key, values) = split_assignment(s)?;
    let value = match ParamValue::parse(values) {
        list @ ParamValue::List(_) => list,
        scalar => ParamValue::List(vec![scalar]),
    };
    Ok((key.to_string(), value))
}

fn parse_params(assignments: &[String]) -> Result<FilterParams, Box<dyn Error>> {
    let mut params = FilterParams::new();
    for a in assignments {
        let (key, value) = split_assignment(a)?;
        params.set(key, ParamValue::parse(value));
    }
    Ok(params)
}

fn build_theme(cli: &Cli) -> Result<Theme, Box<dyn Error>> {
    let mut theme = match &cli.theme {
        Some(path) => Theme::from_json_file(path)?,
        None => Theme::default(),
    };
    theme.for_saving = true;
    if let Some(context) = &cli.context {
        theme = theme.with_context(context.parse::<Context>()?);
    }
    if let Some(dpi) = cli.dpi {
        theme = theme.with_dpi(dpi);
    }
    theme.validate()?;
    Ok(theme)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let theme = build_theme(&cli)?;

    let figure = match &cli.command {
        Command::Fetch { name } => {
            let summary = match datasets::load_image(name)? {
                ImageSource::Array(array) => format!("array of shape {:?}", array.shape()),
                ImageSource::List(items) => format!("list of {} images", items.len()),
            };
            println!("{name}: {summary} cached in {}", datasets::cache_dir().display());
            return Ok(());
        }
        Command::Show { file, style } => {
            let image = ImageData::from_dyn(load_array(file)?)?;
            imgplot(image, &style.to_style(), &theme)?
        }
        Command::Grid {
            files,
            col_wrap,
            axis,
            start,
            stop,
            step,
            cmap,
            height,
            aspect,
            robust,
        } => {
            let mut arrays: Vec<ArrayD<f64>> = files
                .iter()
                .map(load_array)
                .collect::<Result<_, _>>()?;
            let source = if arrays.len() == 1 {
                ImageSource::Array(arrays.remove(0))
            } else {
                ImageSource::List(arrays)
            };
            let cmap = match cmap {
                Some(list) if list.contains(',') => Param::each(list.split(',').map(str::trim)),
                Some(name) => Param::all(name.as_str()),
                None => Param::unset(),
            };
            let options = GridOptions {
                slicing: StackSlicing {
                    axis: *axis,
                    ..Default::default()
                }
                .with_range(*start, *stop, *step),
                col_wrap: *col_wrap,
                height: *height,
                aspect: *aspect,
                cmap,
                robust: Param::One(*robust),
                ..Default::default()
            };
            ImageGrid::new(source, options)?.render(&theme)?
        }
        Command::Sweep {
            file,
            filter,
            row,
            col,
            params,
            col_wrap,
            style,
        } => {
            let data = load_2d(file)?;
            let filter: FilterRef = filter.parse()?;
            let mut shared = parse_params(params)?;
            let mut sweep_key = |arg: &Option<String>| -> Result<Option<String>, Box<dyn Error>> {
                match arg {
                    Some(s) => {
                        let (key, values) = parse_sweep(s)?;
                        shared.set(&key, values);
                        Ok(Some(key))
                    }
                    None => Ok(None),
                }
            };
            let row = sweep_key(row)?;
            let col = sweep_key(col)?;
            let options = ParamGridOptions {
                params: shared,
                row,
                col,
                col_wrap: *col_wrap,
                style: style.to_style(),
                ..Default::default()
            };
            ParamGrid::new(data.view(), filter, options)?.render(&theme)?
        }
        Command::Filter {
            file,
            filter,
            params,
            fft,
            style,
        } => {
            let data = load_2d(file)?;
            let filter: FilterRef = filter.parse()?;
            let options = FilterPlotOptions {
                style: style.to_style(),
                fft: *fft,
                ..Default::default()
            };
            let (figure, _) = filterplot(data.view(), filter, &parse_params(params)?, options, &theme)?;
            figure
        }
    };

    figure.save(&cli.output)?;
    println!("Saved {}", cli.output.display());
    Ok(())
}
