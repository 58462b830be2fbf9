//! Generates a deterministic sample materials dataset in the column contract
//! expected by the dashboard, including a few deliberately broken rows so the
//! excluded-row reporting has something to show.

use chrono::NaiveDate;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const MATERIALS: [(&str, &str, f64); 8] = [
    ("Ethanol 96%", "Solvent", 12.0),
    ("Acetonitrile", "Solvent", 45.0),
    ("Paracetamol API", "API", 180.0),
    ("Ibuprofen API", "API", 220.0),
    ("Lactose Monohydrate", "Excipient", 6.5),
    ("Magnesium Stearate", "Excipient", 9.0),
    ("Gelatin Capsules", "Packaging", 3.2),
    ("HDPE Bottles", "Packaging", 1.8),
];

const VENDORS: [&str; 5] = [
    "Acme Pharma Supply",
    "Helios Chem",
    "Nordwind GmbH",
    "Sakura Fine Chemicals",
    "Brightwell Labs",
];

const PORTALS: [&str; 3] = ["SAP Ariba", "Coupa", "Jaggaer"];
const CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "CHF"];

fn tier_for(price: f64, base: f64) -> &'static str {
    let ratio = price / base;
    if ratio < 0.95 {
        "Low"
    } else if ratio < 1.1 {
        "Medium"
    } else {
        "High"
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    let mut wtr = csv::Writer::from_path("sample_materials.csv").expect("create output file");
    wtr.write_record([
        "Material_ID",
        "Material_Name",
        "Material_Type",
        "Vendor_Name",
        "Supplier_Portal_Name",
        "Unit_Price_Latest",
        "Benchmark_Price",
        "Currency",
        "Price_Deviation (%)",
        "GMP_Compliance",
        "Price_Tier",
        "Price_Source_Timestamp",
    ])
    .expect("write header");

    for i in 0..150u32 {
        let (name, material_type, base) = *rng.pick(&MATERIALS);
        let vendor = *rng.pick(&VENDORS);
        let portal = *rng.pick(&PORTALS);
        let currency = *rng.pick(&CURRENCIES);

        let benchmark = base * (0.95 + rng.next_f64() * 0.1);
        let deviation = (rng.next_f64() - 0.5) * 30.0;
        let price = benchmark * (1.0 + deviation / 100.0);
        let gmp = match rng.next_u64() % 10 {
            0..=6 => "Yes",
            7..=8 => "No",
            _ => "",
        };
        let date = start + chrono::Duration::days((rng.next_u64() % 365) as i64);

        wtr.write_record([
            format!("MAT-{i:04}"),
            name.to_string(),
            material_type.to_string(),
            vendor.to_string(),
            portal.to_string(),
            format!("{price:.2}"),
            format!("{benchmark:.2}"),
            currency.to_string(),
            format!("{deviation:.2}%"),
            gmp.to_string(),
            tier_for(price, base).to_string(),
            date.format("%d-%m-%Y").to_string(),
        ])
        .expect("write row");
    }

    // A few broken rows so the dashboard's validation reporting is visible.
    let broken = [
        [
            "MAT-9001",
            "Ethanol 96%",
            "Solvent",
            "Acme Pharma Supply",
            "Coupa",
            "13.10",
            "12.50",
            "USD",
            "4.8%",
            "Yes",
            "Medium",
            "sometime in march",
        ],
        [
            "MAT-9002",
            "Acetonitrile",
            "Solvent",
            "Helios Chem",
            "SAP Ariba",
            "44.20",
            "45.00",
            "EUR",
            "n/a",
            "No",
            "Medium",
            "15-06-2024",
        ],
        [
            "",
            "Lactose Monohydrate",
            "Excipient",
            "Nordwind GmbH",
            "Jaggaer",
            "6.30",
            "6.50",
            "EUR",
            "-3.1%",
            "Yes",
            "Low",
            "20-07-2024",
        ],
    ];
    for row in broken {
        wtr.write_record(row).expect("write row");
    }

    wtr.flush().expect("flush output");
    println!("Wrote sample_materials.csv (150 valid rows + 3 broken rows)");
}
