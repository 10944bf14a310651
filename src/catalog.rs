//! Static catalogs: indicator labels and curated country groups.
//!
//! Both tables are compiled in and never change at runtime. Indicator labels are
//! the keys users select by; the provider codes are only needed when requesting
//! a series.

use serde::Serialize;

/// Indicator label -> provider code. Several labels may share a code.
pub const INDICATORS: &[(&str, &str)] = &[
    // GDP and Growth Indicators
    ("GDP (Current US$)", "NY.GDP.MKTP.CD"),
    ("GDP Growth (Annual %)", "NY.GDP.MKTP.KD.ZG"),
    ("GDP Per Capita", "NY.GDP.PCAP.CD"),
    ("GDP Per Capita Growth", "NY.GDP.PCAP.KD.ZG"),
    ("GNI Per Capita", "NY.GNP.PCAP.CD"),
    ("GNI Atlas Method", "NY.GNP.PCAP.CD"),
    ("GDP Deflator", "NY.GDP.DEFL.ZS"),
    ("Gross Capital Formation", "NE.GDI.TOTL.ZS"),
    ("Final Consumption Expenditure", "NE.CON.TOTL.ZS"),
    // Inflation and Monetary Policy
    ("Inflation Rate (Consumer Prices)", "FP.CPI.TOTL.ZG"),
    ("Food Inflation", "FP.CPI.FOOD.ZG"),
    ("Core Inflation", "FP.CPI.TOTL.ZG"),
    ("Money Supply Growth", "FM.LBL.BMNY.ZG"),
    ("Interest Rate", "FR.INR.RINR"),
    ("Real Interest Rate", "FR.INR.RINR"),
    ("Exchange Rate", "PA.NUS.FCRF"),
    ("Official Exchange Rate", "PA.NUS.FCRF"),
    // Labor Market and Employment
    ("Unemployment Rate", "SL.UEM.TOTL.ZS"),
    ("Youth Unemployment", "SL.UEM.1524.ZS"),
    ("Female Unemployment", "SL.UEM.TOTL.FE.ZS"),
    ("Male Unemployment", "SL.UEM.TOTL.MA.ZS"),
    ("Labor Force Participation", "SL.TLF.CACT.ZS"),
    ("Employment in Services (%)", "SL.SRV.EMPL.ZS"),
    ("Employment in Industry (%)", "SL.IND.EMPL.ZS"),
    ("Employment in Agriculture (%)", "SL.AGR.EMPL.ZS"),
    ("Labor Productivity", "SL.GDP.PCAP.EM.KD"),
    // Demographics and Population
    ("Population", "SP.POP.TOTL"),
    ("Population Growth", "SP.POP.GROW"),
    ("Urban Population (%)", "SP.URB.TOTL.IN.ZS"),
    ("Rural Population (%)", "SP.RUR.TOTL.ZS"),
    ("Population Density", "EN.POP.DNST"),
    ("Life Expectancy", "SP.DYN.LE00.IN"),
    ("Female Life Expectancy", "SP.DYN.LE00.FE.IN"),
    ("Male Life Expectancy", "SP.DYN.LE00.MA.IN"),
    ("Fertility Rate", "SP.DYN.TFRT.IN"),
    ("Birth Rate", "SP.DYN.CBRT.IN"),
    ("Death Rate", "SP.DYN.CDRT.IN"),
    ("Infant Mortality Rate", "SP.DYN.IMRT.IN"),
    ("Child Mortality Rate (Under 5)", "SH.DYN.MORT"),
    ("Age Dependency Ratio", "SP.POP.DPND"),
    // International Trade
    ("Exports of Goods and Services", "NE.EXP.GNFS.CD"),
    ("Imports of Goods and Services", "NE.IMP.GNFS.CD"),
    ("Trade Balance", "NE.RSB.GNFS.CD"),
    ("Trade (% of GDP)", "NE.TRD.GNFS.ZS"),
    ("Current Account Balance", "BN.CAB.XOKA.CD"),
    ("Current Account Balance (% GDP)", "BN.CAB.XOKA.GD.ZS"),
    ("Merchandise Trade (% GDP)", "TG.VAL.TOTL.GD.ZS"),
    ("Services Trade (% GDP)", "BG.GSR.NFSV.GD.ZS"),
    ("Export Value Index", "TX.QTY.MRCH.XD.WD"),
    ("Import Value Index", "TM.QTY.MRCH.XD.WD"),
    ("Terms of Trade", "TT.PRI.MRCH.XD.WD"),
    // Foreign Investment and Capital Flows
    ("Foreign Direct Investment", "BX.KLT.DINV.CD.WD"),
    ("FDI Inflows (% GDP)", "BX.KLT.DINV.WD.GD.ZS"),
    ("FDI Outflows", "BM.KLT.DINV.CD.WD"),
    ("Portfolio Investment", "BX.PEF.TOTL.CD.WD"),
    ("External Debt", "DT.DOD.DECT.CD"),
    ("Total Reserves", "FI.RES.TOTL.CD"),
    ("Reserves (Months of Imports)", "FI.RES.TOTL.MO"),
    // Government Finance
    ("Government Debt (% of GDP)", "GC.DOD.TOTL.GD.ZS"),
    ("Government Expenditure (% of GDP)", "GC.XPN.TOTL.GD.ZS"),
    ("Government Revenue (% GDP)", "GC.REV.TOTL.GD.ZS"),
    ("Tax Revenue (% of GDP)", "GC.TAX.TOTL.GD.ZS"),
    ("Budget Balance (% GDP)", "GC.BAL.TOTL.GD.ZS"),
    ("Military Expenditure (% of GDP)", "MS.MIL.XPND.GD.ZS"),
    ("Public Debt Service", "GC.DOD.TOTL.GD.ZS"),
    // Infrastructure and Technology
    ("Internet Users (%)", "IT.NET.USER.ZS"),
    ("Mobile Subscriptions", "IT.CEL.SETS.P2"),
    ("Fixed Broadband Subscriptions", "IT.NET.BBND.P2"),
    ("Telephone Lines", "IT.MLT.MAIN.P2"),
    ("Electric Power Consumption", "EG.USE.ELEC.KH.PC"),
    ("Electricity Production", "EG.ELC.PROD.KH"),
    ("Energy Use Per Capita", "EG.USE.PCAP.KG.OE"),
    ("Railway Lines (km)", "IS.RRS.TOTL.KM"),
    ("Road Density", "IS.ROD.DNST.K2"),
    ("Air Transport Passengers", "IS.AIR.PSGR"),
    ("Container Port Traffic", "IS.SHP.GOOD.TU"),
    // Environment and Energy
    ("CO2 Emissions (kt)", "EN.ATM.CO2E.KT"),
    ("CO2 Emissions Per Capita", "EN.ATM.CO2E.PC"),
    ("Methane Emissions", "EN.ATM.METH.KT.CE"),
    ("Nitrous Oxide Emissions", "EN.ATM.NOXE.KT.CE"),
    ("Renewable Energy (%)", "EG.FEC.RNEW.ZS"),
    ("Fossil Fuel Consumption", "EG.USE.COMM.FO.ZS"),
    ("Forest Area (%)", "AG.LND.FRST.ZS"),
    ("Agricultural Land (%)", "AG.LND.AGRI.ZS"),
    ("Arable Land (%)", "AG.LND.ARBL.ZS"),
    ("Water Resources", "ER.H2O.INTR.PC"),
    ("PM2.5 Air Pollution", "EN.ATM.PM25.MC.M3"),
    // Education
    ("Education Expenditure (% of GDP)", "SE.XPD.TOTL.GD.ZS"),
    ("Primary Education Completion", "SE.PRM.CMPT.ZS"),
    ("Secondary Education Enrollment", "SE.SEC.NENR"),
    ("Tertiary Education Enrollment", "SE.TER.ENRR"),
    ("Adult Literacy Rate", "SE.ADT.LITR.ZS"),
    ("Youth Literacy Rate", "SE.ADT.1524.LT.ZS"),
    ("Female Literacy Rate", "SE.ADT.LITR.FE.ZS"),
    ("School Life Expectancy", "SE.SCH.LIFE"),
    ("Primary School Enrollment", "SE.PRM.NENR"),
    ("Pupil-Teacher Ratio", "SE.PRM.ENRL.TC.ZS"),
    // Health
    ("Health Expenditure (% of GDP)", "SH.XPD.CHEX.GD.ZS"),
    ("Health Expenditure Per Capita", "SH.XPD.CHEX.PC.CD"),
    ("Hospital Beds (per 1000)", "SH.MED.BEDS.ZS"),
    ("Physicians (per 1000)", "SH.MED.PHYS.ZS"),
    ("Nurses and Midwives (per 1000)", "SH.MED.NUMW.P3"),
    ("Immunization Rate (DPT)", "SH.IMM.IDPT"),
    ("Immunization Rate (Measles)", "SH.IMM.MEAS"),
    ("Maternal Mortality Rate", "SH.STA.MMRT"),
    ("Malnutrition Prevalence", "SH.STA.MALN.ZS"),
    ("HIV Prevalence", "SH.DYN.AIDS.ZS"),
    ("Tuberculosis Incidence", "SH.TBS.INCD"),
    // Agriculture and Food Security
    ("Food Production Index", "AG.PRD.FOOD.XD"),
    ("Crop Production Index", "AG.PRD.CROP.XD"),
    ("Livestock Production Index", "AG.PRD.LVSK.XD"),
    ("Fertilizer Consumption", "AG.CON.FERT.ZS"),
    ("Cereal Yield", "AG.YLD.CREL.KG"),
    ("Agricultural Value Added", "NV.AGR.TOTL.ZS"),
    ("Rural Population", "SP.RUR.TOTL.ZS"),
    ("Permanent Cropland", "AG.LND.CROP.ZS"),
    // Innovation and Research
    ("R&D Expenditure (% of GDP)", "GB.XPD.RSDV.GD.ZS"),
    ("Researchers (per million)", "SP.POP.SCIE.RD.P6"),
    ("Patent Applications", "IP.PAT.RESD"),
    ("Trademark Applications", "IP.TMK.RESD"),
    ("High-tech Exports (%)", "TX.VAL.TECH.CD"),
    ("Scientific Publications", "IP.JRN.ARTC.SC"),
    // Social Protection and Poverty
    ("Poverty Headcount ($1.90)", "SI.POV.DDAY"),
    ("Poverty Headcount ($3.20)", "SI.POV.LMIC"),
    ("Poverty Headcount ($5.50)", "SI.POV.UMIC"),
    ("GINI Index", "SI.POV.GINI"),
    ("Income Share - Bottom 10%", "SI.DST.FRST.10"),
    ("Income Share - Top 10%", "SI.DST.10TH.10"),
    ("Social Protection Coverage", "per_si_allsi.cov_pop_tot"),
];

/// Indicators preselected on a fresh session.
pub const DEFAULT_INDICATORS: &[&str] = &["GDP (Current US$)", "GDP Growth (Annual %)"];

/// Country list shown when the directory endpoint cannot be reached.
pub const FALLBACK_COUNTRIES: &[(&str, &str)] = &[
    ("BRA", "Brazil"),
    ("CAN", "Canada"),
    ("CHN", "China"),
    ("FRA", "France"),
    ("DEU", "Germany"),
    ("IND", "India"),
    ("ITA", "Italy"),
    ("JPN", "Japan"),
    ("RUS", "Russia"),
    ("KOR", "South Korea"),
    ("GBR", "United Kingdom"),
    ("USA", "United States"),
];

/// Provider code for an indicator label, if the label is known.
pub fn indicator_code(label: &str) -> Option<&'static str> {
    INDICATORS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, code)| *code)
}

/// All indicator labels, sorted alphabetically for selection lists.
pub fn indicator_labels() -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = INDICATORS.iter().map(|(l, _)| *l).collect();
    labels.sort_unstable();
    labels
}

/// Display color tag of a country group (theme palette names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Primary,
    Secondary,
    Success,
    Info,
    Warning,
    Dark,
}

impl GroupColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Primary => "primary",
            GroupColor::Secondary => "secondary",
            GroupColor::Success => "success",
            GroupColor::Info => "info",
            GroupColor::Warning => "warning",
            GroupColor::Dark => "dark",
        }
    }
}

/// A curated set of countries for quick selection.
#[derive(Debug, Clone, Serialize)]
pub struct CountryGroup {
    pub tag: &'static str,
    pub name: &'static str,
    pub countries: &'static [&'static str],
    pub color: GroupColor,
    pub description: &'static str,
}

pub const COUNTRY_GROUPS: &[CountryGroup] = &[
    CountryGroup {
        tag: "G7",
        name: "G7 Advanced Economies",
        countries: &["USA", "JPN", "DEU", "GBR", "FRA", "ITA", "CAN"],
        color: GroupColor::Primary,
        description: "Group of Seven most advanced economies",
    },
    CountryGroup {
        tag: "G20",
        name: "G20 Major Economies",
        countries: &[
            "USA", "CHN", "JPN", "DEU", "IND", "GBR", "FRA", "ITA", "BRA", "CAN", "RUS", "KOR",
            "AUS", "MEX", "IDN", "SAU", "TUR", "ARG", "ZAF",
        ],
        color: GroupColor::Info,
        description: "Group of Twenty major economies",
    },
    CountryGroup {
        tag: "BRICS",
        name: "BRICS Emerging Markets",
        countries: &["BRA", "RUS", "IND", "CHN", "ZAF"],
        color: GroupColor::Warning,
        description: "Brazil, Russia, India, China, South Africa",
    },
    CountryGroup {
        tag: "EU_MAJOR",
        name: "Major EU Economies",
        countries: &["DEU", "FRA", "ITA", "ESP", "NLD", "BEL", "POL", "GRC", "PRT", "AUT"],
        color: GroupColor::Info,
        description: "Largest European Union economies",
    },
    CountryGroup {
        tag: "ASEAN_MAJOR",
        name: "Major ASEAN Economies",
        countries: &["IDN", "THA", "SGP", "MYS", "PHL", "VNM"],
        color: GroupColor::Success,
        description: "Association of Southeast Asian Nations - Major economies",
    },
    CountryGroup {
        tag: "NORDIC",
        name: "Nordic Countries",
        countries: &["SWE", "NOR", "DNK", "FIN", "ISL"],
        color: GroupColor::Secondary,
        description: "Northern European countries",
    },
    CountryGroup {
        tag: "MIDDLE_EAST_OIL",
        name: "Middle East Oil Producers",
        countries: &["SAU", "ARE", "KWT", "QAT", "BHR", "OMN"],
        color: GroupColor::Dark,
        description: "Major oil-producing countries in the Middle East",
    },
    CountryGroup {
        tag: "AFRICA_MAJOR",
        name: "Major African Economies",
        countries: &["ZAF", "NGA", "EGY", "KEN", "ETH", "GHA", "TUN", "MAR", "AGO", "TZA"],
        color: GroupColor::Success,
        description: "Largest economies in Africa",
    },
    CountryGroup {
        tag: "LATIN_AMERICA",
        name: "Major Latin American Economies",
        countries: &["BRA", "MEX", "ARG", "COL", "CHL", "PER", "URY", "ECU"],
        color: GroupColor::Warning,
        description: "Largest economies in Latin America",
    },
    CountryGroup {
        tag: "TRANSITION_ECONOMIES",
        name: "Transition Economies",
        countries: &["RUS", "UKR", "KAZ", "BLR", "UZB", "AZE", "GEO", "ARM"],
        color: GroupColor::Secondary,
        description: "Post-Soviet transition economies",
    },
    CountryGroup {
        tag: "SMALL_ISLAND_STATES",
        name: "Small Island Developing States",
        countries: &["FJI", "MDV", "MHL", "FSM", "NRU", "PLW", "SLB", "TON", "TUV", "VUT"],
        color: GroupColor::Info,
        description: "Small island developing states facing unique challenges",
    },
];

/// Look up a group by tag (case-insensitive).
pub fn country_group(tag: &str) -> Option<&'static CountryGroup> {
    COUNTRY_GROUPS
        .iter()
        .find(|g| g.tag.eq_ignore_ascii_case(tag.trim()))
}

impl CountryGroup {
    /// Members that are present in `known`, in group order.
    pub fn members_in<'a, I>(&self, known: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: std::collections::BTreeSet<&str> = known.into_iter().collect();
        self.countries
            .iter()
            .filter(|c| known.contains(*c))
            .map(|c| c.to_string())
            .collect()
    }
}
