//! Interactive text menu over an [`Inventory`].
//!
//! Generic over the reader and writer so sessions can be scripted in tests.

use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use stockroom_inventory::{
    AddOutcome, Inventory, ModifyOutcome, Product, ProductUpdate, RemoveOutcome, Supplier,
};

const MENU: &str = "\n=== GESTIÓN DE INVENTARIO ===
1. Añadir producto
2. Mostrar inventario
3. Buscar producto
4. Modificar producto
5. Eliminar producto
6. Calcular valor total
7. Mostrar productos de un proveedor
8. Guardar y salir";

/// Open the inventory at `path`, with a hint when the file contents are the problem.
pub fn open_inventory(path: &Path) -> anyhow::Result<Inventory> {
    match Inventory::open(path) {
        Ok(inventory) => Ok(inventory),
        Err(err) if err.is_malformed() => {
            tracing::error!(path = %path.display(), %err, "inventory file rejected");
            Err(anyhow::Error::new(err).context(format!(
                "{} is not a valid inventory file; fix or move it before starting",
                path.display()
            )))
        }
        Err(err) => Err(err).with_context(|| format!("failed to load {}", path.display())),
    }
}

/// A menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    List,
    Find,
    Modify,
    Remove,
    TotalValue,
    BySupplier,
    SaveAndExit,
}

impl Command {
    pub fn parse(option: &str) -> Option<Self> {
        match option.trim() {
            "1" => Some(Command::Add),
            "2" => Some(Command::List),
            "3" => Some(Command::Find),
            "4" => Some(Command::Modify),
            "5" => Some(Command::Remove),
            "6" => Some(Command::TotalValue),
            "7" => Some(Command::BySupplier),
            "8" => Some(Command::SaveAndExit),
            _ => None,
        }
    }
}

/// Whether the loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu until option 8 or end of input, then save.
    pub fn run(&mut self, inventory: &mut Inventory) -> anyhow::Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(option) = self.prompt("Seleccione una opción: ")? else {
                break;
            };

            let Some(command) = Command::parse(&option) else {
                writeln!(self.output, "Opción incorrecta")?;
                continue;
            };

            if self.dispatch(command, inventory)? == Flow::Exit {
                return Ok(());
            }
        }

        // End of input behaves like option 8.
        self.save(inventory)
    }

    fn dispatch(&mut self, command: Command, inventory: &mut Inventory) -> anyhow::Result<Flow> {
        match command {
            Command::Add => self.add(inventory)?,
            Command::List => {
                for product in inventory.list() {
                    writeln!(self.output, "{product}")?;
                }
            }
            Command::Find => {
                let code = self.ask("Introduce el código del producto a buscar: ")?;
                match inventory.find(&code) {
                    Some(product) => writeln!(self.output, "{product}")?,
                    None => writeln!(self.output, "Producto no encontrado.")?,
                }
            }
            Command::Modify => self.modify(inventory)?,
            Command::Remove => {
                let code = self.ask("Introduce el código del producto a eliminar: ")?;
                match inventory.remove(&code) {
                    RemoveOutcome::Removed => writeln!(self.output, "Producto eliminado.")?,
                    RemoveOutcome::NotFound => writeln!(self.output, "El producto no existe.")?,
                }
            }
            Command::TotalValue => {
                let valuation = inventory.total_value();
                for skipped in &valuation.skipped {
                    writeln!(self.output, "Error en {}: {}", skipped.code, skipped.reason)?;
                }
                writeln!(self.output, "El valor total es de: {}", valuation.total)?;
            }
            Command::BySupplier => {
                let name = self.ask("Introduce el nombre del proveedor a buscar: ")?;
                let found = inventory.by_provider(&name);
                if found.is_empty() {
                    writeln!(self.output, "No hay productos del proveedor.")?;
                } else {
                    writeln!(self.output, "Productos del proveedor '{name}':")?;
                    for product in found {
                        writeln!(self.output, "{product}")?;
                    }
                }
            }
            Command::SaveAndExit => {
                if let Err(err) = self.save(inventory) {
                    tracing::error!("{err:#}");
                    writeln!(self.output, "No se pudo guardar: {err:#}")?;
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    fn add(&mut self, inventory: &mut Inventory) -> anyhow::Result<()> {
        let code = self.ask("Introduce el código: ")?;
        let name = self.ask("Introduce el nombre: ")?;
        let price = self.ask("Introduce el precio: ")?;
        let stock = self.ask("Introduce el stock: ")?;
        let supplier_name = self.ask("Introduce el nombre del proveedor: ")?;
        let supplier_contact = self.ask("Introduce el contacto del proveedor: ")?;

        let supplier = Supplier::new(supplier_name, supplier_contact);
        let product = match Product::parse(&code, &name, &price, &stock, supplier) {
            Ok(product) => product,
            Err(err) => {
                tracing::warn!(%err, "rejected product input");
                writeln!(self.output, "Datos no válidos: {err}")?;
                return Ok(());
            }
        };

        match inventory.add(product) {
            AddOutcome::Added => writeln!(self.output, "Producto añadido correctamente.")?,
            AddOutcome::AlreadyExists => writeln!(self.output, "Producto existente.")?,
        }
        Ok(())
    }

    fn modify(&mut self, inventory: &mut Inventory) -> anyhow::Result<()> {
        let code = self.ask("Introduce el código del producto a modificar: ")?;
        let name = self.ask("Nuevo nombre: ")?;
        let price = self.ask("Nuevo precio: ")?;
        let stock = self.ask("Nuevo stock: ")?;

        let update = ProductUpdate {
            name: Some(name.as_str()),
            price: Some(price.as_str()),
            stock: Some(stock.as_str()),
        };
        match inventory.modify(&code, update) {
            Ok(ModifyOutcome::Modified) => writeln!(self.output, "Producto modificado correctamente.")?,
            Ok(ModifyOutcome::NotFound) => writeln!(self.output, "El producto no existe.")?,
            Err(err) => {
                tracing::warn!(%err, code = %code, "rejected product update");
                writeln!(self.output, "Datos no válidos: {err}")?;
            }
        }
        Ok(())
    }

    fn save(&mut self, inventory: &mut Inventory) -> anyhow::Result<()> {
        inventory
            .save()
            .with_context(|| format!("failed to save {}", inventory.path().display()))?;
        writeln!(self.output, "Datos guardados y saliendo.")?;
        Ok(())
    }

    /// Print `label` and read one line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&line);
        if matches!(text, Cow::Owned(_)) {
            tracing::warn!("input line was not valid UTF-8; invalid bytes replaced");
        }
        Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like [`Session::prompt`], treating end of input as an empty answer.
    fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        Ok(self.prompt(label)?.unwrap_or_default())
    }
}
