macro_rules! render_miette {
    ($diag:expr) => {{
        use miette::{GraphicalReportHandler, GraphicalTheme, Report};

        let report: Report = $diag.into();
        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(80)
            .render_report(&mut out, &*report)
            .unwrap();
        out
    }};
}

macro_rules! assert_miette_contains {
    ($result:expr, $($needle:expr),+ $(,)?) => {{
        let out = crate::testing_tools::render_miette!($result.unwrap_err());
        $(
            assert!(
                out.contains($needle),
                "expected {:?} in the rendered report of `{}`:\n{out}",
                $needle,
                stringify!($result)
            );
        )+
    }};
}

pub(crate) use assert_miette_contains;
pub(crate) use render_miette;
