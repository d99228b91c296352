use wp_form::*;

fn rate_plot(rate_window: &str, expert: bool) -> FormState {
    let mut form = FormState::new();
    form.apply(FormEvent::SetExpertMode(expert)).unwrap();
    form.apply(FormEvent::SetField {
        ident: "rw0".to_string(),
        value: rate_window.into(),
    })
    .unwrap();
    form
}

#[test]
fn rate_window_controls_shift_and_count() {
    let form = rate_plot("10", true);
    let settings = serialize(&form);
    assert_eq!(settings["rw0"], SettingValue::text("10"));
    assert_eq!(settings["rs0"], SettingValue::text("1"));
    assert_eq!(settings["rc0"], SettingValue::text("1"));

    for blank in ["", "  ", "\t"] {
        let settings = serialize(&rate_plot(blank, true));
        assert!(!settings.contains_key("rs0"), "rs0 sent for {:?}", blank);
        assert!(!settings.contains_key("rc0"), "rc0 sent for {:?}", blank);
    }
}

#[test]
fn expert_mode_off_dominates_every_rule() {
    let mut form = rate_plot("10", true);
    form.apply(FormEvent::SetTwinAxis {
        plot: 0,
        axis: Some(Axis::Y),
    })
    .unwrap();
    form.apply(FormEvent::AddPlot).unwrap();

    let vis = form.apply(FormEvent::SetExpertMode(false)).unwrap();
    for plot in form.plots() {
        for (key, _, def) in plot.fields() {
            if def.expert {
                assert!(vis.is_hidden(&key.to_string()), "{} visible", key);
            }
        }
    }
    for def in GLOBAL_FIELDS.iter().filter(|d| d.expert) {
        assert!(vis.is_hidden(def.name), "{} visible", def.name);
    }

    // switching back re-derives twin and rate visibility from kept values
    let vis = form.apply(FormEvent::SetExpertMode(true)).unwrap();
    assert!(vis.is_enabled("rs0"));
    assert!(vis.is_enabled("rs1"));
    assert!(vis.is_enabled("yrtw"));
    assert!(vis.is_hidden("xrtw"));
}

#[test]
fn plot_count_stays_within_bounds() {
    let mut form = FormState::new();
    for expected in 2..=MAX_PLOTS {
        form.apply(FormEvent::AddPlot).unwrap();
        assert_eq!(form.plot_count(), expected);
    }
    assert!(matches!(
        form.apply(FormEvent::AddPlot),
        Err(FormError::TooManyPlots { max: 4 })
    ));
    assert_eq!(form.plot_count(), MAX_PLOTS);

    for _ in 1..MAX_PLOTS {
        form.apply(FormEvent::RemovePlot(0)).unwrap();
    }
    assert!(matches!(
        form.apply(FormEvent::RemovePlot(0)),
        Err(FormError::LastPlot)
    ));
    assert_eq!(form.plot_count(), 1);
}

#[test]
fn removing_a_middle_plot_renumbers_the_rest() {
    let mut form = FormState::with_plot_count(3);
    form.set_field("x0", "a".into()).unwrap();
    form.set_field("x1", "b".into()).unwrap();
    form.set_field("x2", "c".into()).unwrap();

    form.apply(FormEvent::RemovePlot(1)).unwrap();

    let settings = serialize(&form);
    assert_eq!(settings["x0"], SettingValue::text("a"));
    assert_eq!(settings["x1"], SettingValue::text("c"));
    assert!(!settings.contains_key("x2"));
    assert!(!settings.contains_key("m2"));
    validate_form(&form).unwrap();
}

#[test]
fn pasted_settings_restore_the_form() {
    let text = r#"{
        "plots": 2, "expertmode": true,
        "s0": "data/wetter.h5:/raw/zeuthen_weather", "m0": "xy", "x0": "time", "y0": "p", "tw0": "y",
        "s1": "data/wetter.h5:/raw/zeuthen_weather", "m1": "xy", "x1": "time", "y1": "T_a",
        "o1color": "r", "rw1": "", "yltw": "temperature",
        "png": "plots/plot-1.png", "pdf": "plots/plot-1.pdf", "svg": "plots/plot-1.svg"
    }"#;
    let form = deserialize(&parse_settings_json(text).unwrap()).unwrap();

    assert_eq!(form.plot_count(), 2);
    assert!(form.expert_mode());
    let vis = evaluate(&form);
    assert!(vis.is_enabled("yltw"));
    assert_eq!(form.global("yltw"), Some(&SettingValue::text("temperature")));
    assert_eq!(form.plot(1).unwrap().text(FieldStem::new("o", "color")), "r");
}

#[test]
fn backend_scale_and_projection_names_restore() {
    let text = r#"{
        "plots": 1, "m0": "map", "x0": "lon", "y0": "lat",
        "o0projection": "robin", "xs": "linear", "ys": "log"
    }"#;
    let form = deserialize(&parse_settings_json(text).unwrap()).unwrap();

    let settings = serialize(&form);
    assert_eq!(settings["o0projection"], SettingValue::text("robin"));
    assert_eq!(settings["xs"], SettingValue::text("linear"));
    assert_eq!(settings["ys"], SettingValue::text("log"));
}

#[test]
fn plot_options_survive_a_round_trip() {
    let text = r#"{
        "plots": 2, "expertmode": true,
        "m0": "h1", "x0": "T_a", "o0style": "histline",
        "m1": "map", "x1": "lon", "y1": "lat", "o1markersize": "3",
        "o1cbfrac": "0.05", "o1drawcountries": "1"
    }"#;
    let mut form = deserialize(&parse_settings_json(text).unwrap()).unwrap();

    let settings = serialize(&form);
    assert_eq!(settings["o0style"], SettingValue::text("histline"));
    assert_eq!(settings["o1markersize"], SettingValue::text("3"));
    assert_eq!(settings["o1cbfrac"], SettingValue::text("0.05"));
    assert_eq!(deserialize(&settings).unwrap(), form);

    // uncatalogued options move with their plot
    form.apply(FormEvent::RemovePlot(0)).unwrap();
    let settings = serialize(&form);
    assert_eq!(settings["o0markersize"], SettingValue::text("3"));
    assert_eq!(settings["o0drawcountries"], SettingValue::text("1"));
    assert!(!settings.contains_key("o1cbfrac"));
    assert!(!settings.contains_key("o0style"));
    validate_form(&form).unwrap();
}
