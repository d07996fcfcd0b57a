use crate::report::beeswarm::{self, escape_svg};
use crate::report::general_stats::HEADERS;
use crate::report::{MODULE, ReportContext, STATS_SECTION};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn write(path: &Path, ctx: &ReportContext<'_>) -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let html = render(ctx, ts)?;
    let mut w =
        BufWriter::new(File::create(path).with_context(|| "create mirtop_report.html failed")?);
    w.write_all(html.as_bytes())?;
    w.flush()?;
    Ok(())
}

pub fn render(ctx: &ReportContext<'_>, ts: u64) -> Result<String> {
    let mut html = String::with_capacity(64 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{} report</title>", MODULE.name)?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(html, "h2{{margin:24px 0 8px 0;font-size:20px;}}")?;
    writeln!(
        html,
        ".meta{{color:#555;font-size:13px;margin-bottom:16px;}}"
    )?;
    writeln!(
        html,
        ".module{{border-top:1px solid #eee;padding-top:8px;}}"
    )?;
    writeln!(html, ".plot{{margin:8px 0 6px 0;}}")?;
    writeln!(
        html,
        ".desc{{color:#444;font-size:13px;max-width:1000px;margin:4px 0 10px 0;}}"
    )?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;width:100%;max-width:1000px;font-size:12px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:right;position:relative;}}"
    )?;
    writeln!(
        html,
        ".table th:first-child,.table td:first-child{{text-align:left;}}"
    )?;
    writeln!(
        html,
        ".bar{{position:absolute;left:0;top:0;bottom:0;opacity:0.35;}}"
    )?;
    writeln!(html, ".val{{position:relative;}}")?;
    writeln!(html, "svg{{background:#fafafa;border:1px solid #e5e5e5;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(
        html,
        "<h1 id=\"{}\"><a href=\"{}\">{}</a></h1>",
        MODULE.anchor, MODULE.href, MODULE.name
    )?;
    writeln!(html, "<p class=\"desc\">{} {}</p>", MODULE.name, MODULE.info)?;
    writeln!(
        html,
        "<div class=\"meta\">Samples: <b>{}</b><br/>Files scanned: {} (skipped: {})<br/>Timestamp: {} (unix: {})</div>",
        ctx.table.len(),
        ctx.files_scanned,
        ctx.files_skipped,
        fmt_timestamp(ts),
        ts
    )?;

    general_stats_table(&mut html, ctx)?;
    stats_section(&mut html, ctx)?;
    sources_section(&mut html, ctx)?;

    html.push_str("<script>");
    html.push_str(r#"document.querySelectorAll('table.sortable').forEach(t=>{const h=t.querySelectorAll('th');h.forEach((th,i)=>{th.style.cursor='pointer';th.addEventListener('click',()=>{const rows=[...t.querySelectorAll('tr')].slice(1);const asc=th.getAttribute('data-asc')!=='true';rows.sort((a,b)=>{const av=a.children[i].innerText;const bv=b.children[i].innerText;const an=parseFloat(av);const bn=parseFloat(bv);if(!isNaN(an)&&!isNaN(bn)){return asc?an-bn:bn-an;}return asc?av.localeCompare(bv):bv.localeCompare(av);});th.setAttribute('data-asc',asc);rows.forEach(r=>t.appendChild(r));});});});"#);
    html.push_str("</script>");
    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn general_stats_table(out: &mut String, ctx: &ReportContext<'_>) -> Result<()> {
    writeln!(out, "<div class=\"module\" id=\"general_stats\">")?;
    writeln!(out, "<h2>General Statistics</h2>")?;
    writeln!(out, "<table class=\"table sortable\">")?;
    write!(out, "<tr><th>Sample Name</th>")?;
    for h in &HEADERS {
        write!(
            out,
            "<th title=\"{}: {}\">{}</th>",
            MODULE.name,
            escape_svg(h.description),
            escape_svg(h.title)
        )?;
    }
    writeln!(out, "</tr>")?;

    let ranges: Vec<(f64, f64)> = HEADERS.iter().map(|h| h.range(ctx.table)).collect();
    for (sample, record) in ctx.table.iter() {
        write!(out, "<tr><td>{}</td>", escape_svg(sample))?;
        for (h, range) in HEADERS.iter().zip(&ranges) {
            match record.get(h.key) {
                Some(v) => write!(
                    out,
                    "<td><span class=\"bar\" style=\"width:{:.1}%;background:{}\"></span><span class=\"val\">{}</span></td>",
                    h.fraction(v, *range) * 100.0,
                    scale_color(h.scale),
                    escape_svg(&h.format(v))
                )?,
                None => write!(out, "<td></td>")?,
            }
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;
    writeln!(out, "</div>")?;
    Ok(())
}

fn stats_section(out: &mut String, ctx: &ReportContext<'_>) -> Result<()> {
    writeln!(
        out,
        "<div class=\"module\" id=\"{}\">",
        STATS_SECTION.anchor
    )?;
    writeln!(out, "<h2>{}</h2>", STATS_SECTION.name)?;
    writeln!(out, "<p class=\"desc\">{}</p>", STATS_SECTION.description)?;
    writeln!(out, "<div class=\"plot\">")?;
    out.push_str(&beeswarm::svg(ctx.table)?);
    writeln!(out, "</div>")?;
    writeln!(out, "</div>")?;
    Ok(())
}

fn sources_section(out: &mut String, ctx: &ReportContext<'_>) -> Result<()> {
    writeln!(out, "<div class=\"module\" id=\"data_sources\">")?;
    writeln!(out, "<h2>Data sources</h2>")?;
    writeln!(out, "<table class=\"table sortable\">")?;
    writeln!(out, "<tr><th>Module</th><th>Sample Name</th><th>Source</th></tr>")?;
    for src in ctx.sources.iter() {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            MODULE.name,
            escape_svg(&src.sample_name),
            escape_svg(&src.path.display().to_string())
        )?;
    }
    writeln!(out, "</table>")?;
    writeln!(out, "</div>")?;
    Ok(())
}

/// Representative colour for a named colour-brewer scale.
fn scale_color(scale: &str) -> &'static str {
    match scale {
        "PuBu" => "#74a9cf",
        "RdYlGn" => "#a6d96a",
        _ => "#cccccc",
    }
}

pub(crate) fn fmt_timestamp(ts: u64) -> String {
    let days = (ts / 86_400) as i64;
    let secs = (ts % 86_400) as u32;
    let hour = secs / 3_600;
    let min = (secs % 3_600) / 60;
    let sec = secs % 60;

    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = mp + if mp < 10 { 3 } else { -9 };
    let year = y + if m <= 2 { 1 } else { 0 };

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year, m, d, hour, min, sec
    )
}
