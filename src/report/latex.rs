use crate::report::general_stats::HEADERS;
use crate::report::{MODULE, ReportContext, STATS_SECTION, beeswarm};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};
use zip::ZipWriter;
use zip::write::FileOptions;

const TEX_FILE: &str = "kira_mirtop.tex";
const TABLE_FILE: &str = "general_statistics.tex";
const FIGURE_NAME: &str = "isomir_summary";
const LATEX_ZIP: &str = "kira_mirtop_latex.zip";

/// Writes the `latex/` export under `out_dir` and returns every file written.
pub fn write(out_dir: &Path, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>> {
    let latex_dir = out_dir.join("latex");
    let figures_dir = latex_dir.join("figures");
    let tables_dir = latex_dir.join("tables");
    fs::create_dir_all(&figures_dir)?;
    fs::create_dir_all(&tables_dir)?;
    let mut written = Vec::new();

    let table_path = tables_dir.join(TABLE_FILE);
    fs::write(&table_path, general_stats_table(ctx))
        .with_context(|| format!("failed to write {}", table_path.display()))?;
    written.push(table_path);

    let svg = beeswarm::svg(ctx.table)?;
    let svg_path = figures_dir.join(format!("{}.svg", FIGURE_NAME));
    fs::write(&svg_path, &svg)
        .with_context(|| format!("failed to write {}", svg_path.display()))?;
    written.push(svg_path);
    let pdf = svg_to_pdf(&svg).with_context(|| format!("failed to convert {} to PDF", FIGURE_NAME))?;
    let pdf_path = figures_dir.join(format!("{}.pdf", FIGURE_NAME));
    fs::write(&pdf_path, pdf).with_context(|| format!("failed to write {}", pdf_path.display()))?;
    written.push(pdf_path);

    written.push(write_readme(&latex_dir)?);
    written.push(write_tex(&latex_dir, ctx)?);
    let zip_path = write_latex_zip(&latex_dir, &written)?;
    written.push(zip_path);
    Ok(written)
}

fn general_stats_table(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();
    out.push_str("\\begin{tabular}{l");
    for _ in &HEADERS {
        out.push('r');
    }
    out.push_str("}\n");
    out.push_str("\\toprule\n");
    out.push_str("Sample");
    for h in &HEADERS {
        out.push_str(&format!(" & {}", escape_tex(h.title)));
    }
    out.push_str(" \\\\\n");
    out.push_str("\\midrule\n");
    for (sample, record) in ctx.table.iter() {
        out.push_str(&escape_tex(sample));
        for h in &HEADERS {
            let cell = record.get(h.key).map(|v| h.format(v)).unwrap_or_default();
            out.push_str(&format!(" & {}", escape_tex(&cell)));
        }
        out.push_str(" \\\\\n");
    }
    out.push_str("\\bottomrule\n");
    out.push_str("\\end{tabular}\n");
    out
}

fn write_tex(latex_dir: &Path, ctx: &ReportContext<'_>) -> Result<PathBuf> {
    let mut out = String::new();
    out.push_str("\\documentclass{article}\n");
    out.push_str("\\usepackage{graphicx}\n");
    out.push_str("\\usepackage{booktabs}\n");
    out.push_str("\\usepackage{caption}\n");
    out.push_str("\\usepackage{float}\n");
    out.push_str("\\usepackage{geometry}\n");
    out.push_str("\\geometry{margin=1in}\n");
    out.push_str(&format!("\\title{{{} Summary Report}}\n", MODULE.name));
    out.push_str("\\author{kira-mirtop}\n");
    out.push_str("\\date{\\today}\n");
    out.push_str("\\begin{document}\n");
    out.push_str("\\maketitle\n");
    out.push_str(&format!(
        "{} {}\n\n",
        MODULE.name,
        escape_tex(MODULE.info)
    ));
    out.push_str(&format!(
        "\\textbf{{Samples:}} {}\\\\\n",
        ctx.table.len()
    ));
    out.push_str("\\textbf{Tool:} kira-mirtop\n");
    out.push_str("\\section*{General statistics}\n");
    out.push_str(&format!("\\input{{tables/{}}}\n", TABLE_FILE));
    out.push_str(&format!("\\section*{{{}}}\n", STATS_SECTION.name));
    out.push_str("\\begin{figure}[H]\n");
    out.push_str("\\centering\n");
    out.push_str(&format!(
        "\\includegraphics[width=\\linewidth]{{figures/{}.pdf}}\n",
        FIGURE_NAME
    ));
    out.push_str("\\caption{Distribution of each miRTop metric across samples}\n");
    out.push_str("\\end{figure}\n");
    out.push_str("\\end{document}\n");

    let path = latex_dir.join(TEX_FILE);
    fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn write_readme(latex_dir: &Path) -> Result<PathBuf> {
    let content = r#"# LaTeX export (kira-mirtop)

This folder contains a self-contained LaTeX report (kira_mirtop.tex), the isomiR summary figure as SVG and PDF, and the general statistics table.

## Compile the report

```
pdflatex kira_mirtop.tex
```

or upload generated zip-file `kira_mirtop_latex.zip` to Overleaf.com
"#;
    let path = latex_dir.join("README.tex.md");
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub(crate) fn escape_tex(s: &str) -> String {
    s.replace('\\', "\\textbackslash{}")
        .replace('&', "\\&")
        .replace('%', "\\%")
        .replace('$', "\\$")
        .replace('#', "\\#")
        .replace('_', "\\_")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('~', "\\textasciitilde{}")
        .replace('^', "\\textasciicircum{}")
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|e| anyhow::anyhow!("usvg parse failed: {e}"))?;
    let pdf = svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| anyhow::anyhow!("svg2pdf conversion failed: {e}"))?;
    Ok(pdf)
}

/// Packs `files` (all under `latex_dir`) as `latex/...` for upload to Overleaf.
fn write_latex_zip(latex_dir: &Path, files: &[PathBuf]) -> Result<PathBuf> {
    let zip_path = latex_dir.join(LATEX_ZIP);
    let file = fs::File::create(&zip_path)
        .with_context(|| format!("failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let opts: FileOptions<'static, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.add_directory("latex/", opts)?;
    zip.add_directory("latex/figures/", opts)?;
    zip.add_directory("latex/tables/", opts)?;

    for path in files {
        let data =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let rel = path
            .strip_prefix(latex_dir)
            .with_context(|| format!("{} is outside the LaTeX folder", path.display()))?;
        let zip_name = format!("latex/{}", rel.to_string_lossy().replace('\\', "/"));
        zip.start_file(zip_name, opts)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    Ok(zip_path)
}
