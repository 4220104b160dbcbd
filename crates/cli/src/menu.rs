//! Line-oriented menu over a ledger.

use std::io::{self, BufRead, Write};
use std::path::Path;

use stockroom_core::parse_delta;
use stockroom_inventory::{
    Grade, ImageStore, ImageUpload, Ledger, ProductForm, ProductRecord, StockStore, summarize,
};

pub struct Menu<R, W> {
    input: R,
    output: W,
}

enum Flow {
    Continue,
    Exit,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run until the user picks "exit" or input ends.
    ///
    /// Ledger errors are reported to the user; only terminal I/O failures are returned.
    pub fn run<S, I>(&mut self, ledger: &mut Ledger<S>, images: &mut I) -> io::Result<()>
    where
        S: StockStore,
        I: ImageStore + ?Sized,
    {
        loop {
            self.print_options()?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };
            let flow = match choice.as_str() {
                "1" => self.register(ledger, images)?,
                "2" => self.view(ledger)?,
                "3" => self.adjust(ledger)?,
                "4" => self.summary(ledger)?,
                "5" => {
                    writeln!(self.output, "Closing. Goodbye!")?;
                    Flow::Exit
                }
                _ => {
                    writeln!(self.output, "Invalid option, try again.")?;
                    Flow::Continue
                }
            };
            if let Flow::Exit = flow {
                return Ok(());
            }
        }
    }

    fn print_options(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", "=".repeat(40))?;
        writeln!(self.output, " STOCK LEDGER - TILES AND SANITARY WARE")?;
        writeln!(self.output, "{}", "=".repeat(40))?;
        writeln!(self.output, "1. Register new product")?;
        writeln!(self.output, "2. View inventory")?;
        writeln!(self.output, "3. Record stock in/out")?;
        writeln!(self.output, "4. Stock summary")?;
        writeln!(self.output, "5. Exit")
    }

    /// `None` when input is exhausted.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn register<S, I>(&mut self, ledger: &mut Ledger<S>, images: &mut I) -> io::Result<Flow>
    where
        S: StockStore,
        I: ImageStore + ?Sized,
    {
        writeln!(self.output, "\n--- NEW PRODUCT ---")?;
        let grades = Grade::ALL.map(|g| g.as_str()).join(", ");
        let prompts = [
            "Supplier code (blank to generate): ".to_string(),
            "Name: ".to_string(),
            "Category (Mayólica, Sanitario, Grifería, Pegamento, Fragua...): ".to_string(),
            "Brand: ".to_string(),
            "Format (e.g. 60x60): ".to_string(),
            format!("Grade ({grades}; blank if not applicable): "),
            "Initial stock: ".to_string(),
            "Unit price (S/): ".to_string(),
            "Photo file (blank for none): ".to_string(),
        ];
        let mut answers = Vec::with_capacity(prompts.len());
        for label in &prompts {
            match self.prompt(label)? {
                Some(answer) => answers.push(answer),
                None => return Ok(Flow::Exit),
            }
        }
        let [id, name, category, brand, format, grade, stock, price, photo]: [String; 9] =
            match answers.try_into() {
                Ok(fields) => fields,
                Err(_) => return Ok(Flow::Exit),
            };

        let form = ProductForm {
            id,
            name,
            category,
            brand,
            format,
            grade,
            stock,
            price,
        };
        let new = match form.parse() {
            Ok(new) => new,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(Flow::Continue);
            }
        };

        let upload = if photo.is_empty() {
            None
        } else {
            match read_photo(&photo) {
                Ok(upload) => Some(upload),
                Err(e) => {
                    writeln!(self.output, "Error: cannot read photo {photo:?}: {e}")?;
                    return Ok(Flow::Continue);
                }
            }
        };

        match ledger.register_with_image(new, upload, images) {
            Ok(record) => writeln!(
                self.output,
                "Registered '{}' with code {}.",
                record.name, record.id
            )?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(Flow::Continue)
    }

    fn view<S: StockStore>(&mut self, ledger: &Ledger<S>) -> io::Result<Flow> {
        let Some(query) = self.prompt("Search (blank for all): ")? else {
            return Ok(Flow::Exit);
        };
        let rows = ledger.search(&query);
        writeln!(self.output, "\n--- INVENTORY ---")?;
        if rows.is_empty() {
            if ledger.is_empty() {
                writeln!(self.output, "The inventory is empty.")?;
            } else {
                writeln!(self.output, "No products match {query:?}.")?;
            }
            return Ok(Flow::Continue);
        }
        self.print_table(&rows)?;
        match summarize(rows.iter().copied()) {
            Ok(summary) => writeln!(
                self.output,
                "{} products, {} units, value S/ {}",
                summary.skus, summary.units, summary.value
            )?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(Flow::Continue)
    }

    fn print_table(&mut self, rows: &[&ProductRecord]) -> io::Result<()> {
        writeln!(
            self.output,
            "{:<12} | {:<25} | {:<12} | {:<12} | {:<8} | {:<6} | {:<10}",
            "CODE", "NAME", "CATEGORY", "BRAND", "FORMAT", "STOCK", "PRICE"
        )?;
        writeln!(self.output, "{}", "-".repeat(100))?;
        for r in rows {
            writeln!(
                self.output,
                "{:<12} | {:<25} | {:<12} | {:<12} | {:<8} | {:<6} | S/ {:<10}",
                r.id.as_str(),
                r.name,
                r.category.as_str(),
                r.brand,
                r.format,
                r.stock,
                r.price
            )?;
        }
        Ok(())
    }

    fn adjust<S: StockStore>(&mut self, ledger: &mut Ledger<S>) -> io::Result<Flow> {
        writeln!(self.output, "\n--- STOCK IN/OUT ---")?;
        let Some(id) = self.prompt("Product code: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(raw_delta) = self.prompt("Quantity to add (positive) or remove (negative, e.g. -5): ")? else {
            return Ok(Flow::Exit);
        };
        let delta = match parse_delta(&raw_delta) {
            Ok(delta) => delta,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(Flow::Continue);
            }
        };

        match ledger.adjust_stock(&id, delta) {
            Ok(stock) => writeln!(self.output, "Stock of {} updated. New total: {stock}", id.trim())?,
            Err(e) => writeln!(self.output, "Denied: {e}")?,
        }
        Ok(Flow::Continue)
    }

    fn summary<S: StockStore>(&mut self, ledger: &Ledger<S>) -> io::Result<Flow> {
        writeln!(self.output, "\n--- SUMMARY ---")?;
        let summary = match summarize(ledger.records()) {
            Ok(summary) => summary,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(Flow::Continue);
            }
        };
        writeln!(self.output, "Products: {}", summary.skus)?;
        writeln!(self.output, "Units: {}", summary.units)?;
        writeln!(self.output, "Value: S/ {}", summary.value)?;
        Ok(Flow::Continue)
    }
}

fn read_photo(path: &str) -> io::Result<ImageUpload> {
    let path = Path::new(path);
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageUpload::new(file_name, bytes))
}
