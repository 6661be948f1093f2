use super::{check_rules, Chapter, Rule, Verdict};

const TODO: &str = "// TODO";

// Chapter 1: module declaration

const MODULE_INITIAL: &str = "\
// TODO: declare a module named `car` inside the `garage` package
";

const MODULE_EXPECTED: &str = "\
module garage::car {
}
";

const MODULE_RULES: &[Rule] = &[Rule {
    pattern: r"\bmodule\s+garage::car\b",
    message: "Missing module declaration: expected `module garage::car`",
    anchor: TODO,
    fallback_line: 1,
}];

fn validate_module(code: &str) -> Verdict {
    check_rules(code, MODULE_RULES, MODULE_EXPECTED)
}

// Chapter 2: the Car object

const STRUCT_INITIAL: &str = "\
module garage::car {
    // TODO: define a `Car` struct with the `key` ability
}
";

const STRUCT_EXPECTED: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }
}
";

const STRUCT_RULES: &[Rule] = &[
    Rule {
        pattern: r"\bstruct\s+Car\b",
        message: "Missing struct declaration: expected `public struct Car`",
        anchor: TODO,
        fallback_line: 2,
    },
    Rule {
        pattern: r"\bstruct\s+Car\s+has\s+key\b",
        message: "`Car` must have the `key` ability to be an object",
        anchor: "struct Car",
        fallback_line: 2,
    },
    Rule {
        pattern: r"\bid\s*:\s*UID\b",
        message: "Objects need an `id: UID` field as their first field",
        anchor: TODO,
        fallback_line: 3,
    },
];

fn validate_struct(code: &str) -> Verdict {
    check_rules(code, STRUCT_RULES, STRUCT_EXPECTED)
}

// Chapter 3: constructor

const NEW_INITIAL: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    // TODO: write a `new` function that builds a Car from its stats
}
";

const NEW_EXPECTED: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }
}
";

const NEW_RULES: &[Rule] = &[
    Rule {
        pattern: r"\bfun\s+new\s*\(",
        message: "Missing function: expected `public fun new(...)`",
        anchor: TODO,
        fallback_line: 9,
    },
    Rule {
        pattern: r"ctx\s*:\s*&\s*mut\s+TxContext",
        message: "`new` needs a `ctx: &mut TxContext` parameter",
        anchor: "fun new",
        fallback_line: 9,
    },
    Rule {
        pattern: r"object::new\s*\(\s*ctx\s*\)",
        message: "Create the object id with `object::new(ctx)`",
        anchor: "fun new",
        fallback_line: 10,
    },
];

fn validate_new(code: &str) -> Verdict {
    check_rules(code, NEW_RULES, NEW_EXPECTED)
}

// Chapter 4: entry function and transfer

const CREATE_INITIAL: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }

    // TODO: add an entry function `create` that sends a new Car to the caller
}
";

const CREATE_EXPECTED: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }

    public entry fun create(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext) {
        let car = new(speed, acceleration, handling, ctx);
        transfer::transfer(car, tx_context::sender(ctx));
    }
}
";

const CREATE_RULES: &[Rule] = &[
    Rule {
        pattern: r"\bentry\s+fun\s+create\s*\(",
        message: "Missing entry function: expected `public entry fun create(...)`",
        anchor: TODO,
        fallback_line: 18,
    },
    Rule {
        pattern: r"transfer::transfer\s*\(",
        message: "Hand the car over with `transfer::transfer`",
        anchor: "fun create",
        fallback_line: 19,
    },
    Rule {
        pattern: r"tx_context::sender\s*\(\s*ctx\s*\)",
        message: "Send the car to `tx_context::sender(ctx)`",
        anchor: "transfer::transfer",
        fallback_line: 20,
    },
];

fn validate_create(code: &str) -> Verdict {
    check_rules(code, CREATE_RULES, CREATE_EXPECTED)
}

// Chapter 5: mutable references

const UPGRADE_INITIAL: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }

    public entry fun create(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext) {
        let car = new(speed, acceleration, handling, ctx);
        transfer::transfer(car, tx_context::sender(ctx));
    }

    // TODO: write `upgrade_speed` that raises a car's speed by `amount`
}
";

const UPGRADE_EXPECTED: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }

    public entry fun create(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext) {
        let car = new(speed, acceleration, handling, ctx);
        transfer::transfer(car, tx_context::sender(ctx));
    }

    public fun upgrade_speed(car: &mut Car, amount: u8) {
        car.speed = car.speed + amount;
    }
}
";

const UPGRADE_RULES: &[Rule] = &[
    Rule {
        pattern: r"\bfun\s+upgrade_speed\s*\(",
        message: "Missing function: expected `public fun upgrade_speed(...)`",
        anchor: TODO,
        fallback_line: 23,
    },
    Rule {
        pattern: r"car\s*:\s*&\s*mut\s+Car\b",
        message: "Take the car as `car: &mut Car` so it can be changed in place",
        anchor: "fun upgrade_speed",
        fallback_line: 23,
    },
    Rule {
        pattern: r"car\.speed\s*=[^=]",
        message: "Assign the new value to `car.speed`",
        anchor: "fun upgrade_speed",
        fallback_line: 24,
    },
];

fn validate_upgrade(code: &str) -> Verdict {
    check_rules(code, UPGRADE_RULES, UPGRADE_EXPECTED)
}

// Chapter 6: destructuring and deleting

const SCRAP_INITIAL: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }

    public entry fun create(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext) {
        let car = new(speed, acceleration, handling, ctx);
        transfer::transfer(car, tx_context::sender(ctx));
    }

    public fun upgrade_speed(car: &mut Car, amount: u8) {
        car.speed = car.speed + amount;
    }

    // TODO: write `scrap` that unpacks a Car and deletes its id
}
";

const SCRAP_EXPECTED: &str = "\
module garage::car {
    public struct Car has key {
        id: UID,
        speed: u8,
        acceleration: u8,
        handling: u8,
    }

    public fun new(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext): Car {
        Car {
            id: object::new(ctx),
            speed,
            acceleration,
            handling,
        }
    }

    public entry fun create(speed: u8, acceleration: u8, handling: u8, ctx: &mut TxContext) {
        let car = new(speed, acceleration, handling, ctx);
        transfer::transfer(car, tx_context::sender(ctx));
    }

    public fun upgrade_speed(car: &mut Car, amount: u8) {
        car.speed = car.speed + amount;
    }

    public fun scrap(car: Car) {
        let Car { id, speed: _, acceleration: _, handling: _ } = car;
        object::delete(id);
    }
}
";

const SCRAP_RULES: &[Rule] = &[
    Rule {
        pattern: r"\bfun\s+scrap\s*\(\s*car\s*:\s*Car\s*\)",
        message: "Missing function: expected `public fun scrap(car: Car)` taking the car by value",
        anchor: TODO,
        fallback_line: 27,
    },
    Rule {
        pattern: r"\blet\s+Car\s*\{",
        message: "Unpack the car with `let Car { id, .. } = car;`",
        anchor: "fun scrap",
        fallback_line: 28,
    },
    Rule {
        pattern: r"object::delete\s*\(\s*id\s*\)",
        message: "Delete the unpacked id with `object::delete(id)`",
        anchor: "fun scrap",
        fallback_line: 29,
    },
];

fn validate_scrap(code: &str) -> Verdict {
    check_rules(code, SCRAP_RULES, SCRAP_EXPECTED)
}

static CHAPTERS: [Chapter; 6] = [
    Chapter {
        id: 1,
        title: "Opening the Garage",
        content: "Every Move package is made of modules. A module is declared with \
                  `module <package>::<name> { ... }` and holds the types and functions \
                  that make up your contract. Declare the `car` module of the `garage` package.",
        initial_code: MODULE_INITIAL,
        expected_code: MODULE_EXPECTED,
        rules: MODULE_RULES,
        validate: validate_module,
    },
    Chapter {
        id: 2,
        title: "Building the Car",
        content: "On Sui, anything stored on chain is an object: a struct with the `key` \
                  ability whose first field is `id: UID`. Give the `Car` a speed, an \
                  acceleration and a handling stat, all `u8`.",
        initial_code: STRUCT_INITIAL,
        expected_code: STRUCT_EXPECTED,
        rules: STRUCT_RULES,
        validate: validate_struct,
    },
    Chapter {
        id: 3,
        title: "The Assembly Line",
        content: "Objects are created inside their own module. Write `new`, which takes \
                  the three stats and a `&mut TxContext`, and returns a `Car` whose id \
                  comes from `object::new(ctx)`.",
        initial_code: NEW_INITIAL,
        expected_code: NEW_EXPECTED,
        rules: NEW_RULES,
        validate: validate_new,
    },
    Chapter {
        id: 4,
        title: "Handing Over the Keys",
        content: "Entry functions can be called directly from a transaction. Add \
                  `create`, which builds a car with `new` and transfers it to the \
                  transaction sender.",
        initial_code: CREATE_INITIAL,
        expected_code: CREATE_EXPECTED,
        rules: CREATE_RULES,
        validate: validate_create,
    },
    Chapter {
        id: 5,
        title: "Tuning the Engine",
        content: "A `&mut` reference lets a function change an object in place. Write \
                  `upgrade_speed`, which adds `amount` to the car's speed.",
        initial_code: UPGRADE_INITIAL,
        expected_code: UPGRADE_EXPECTED,
        rules: UPGRADE_RULES,
        validate: validate_upgrade,
    },
    Chapter {
        id: 6,
        title: "The Scrapyard",
        content: "Objects without `drop` have to be taken apart explicitly. Write \
                  `scrap`, which unpacks the car and deletes its `UID` with \
                  `object::delete`.",
        initial_code: SCRAP_INITIAL,
        expected_code: SCRAP_EXPECTED,
        rules: SCRAP_RULES,
        validate: validate_scrap,
    },
];

/// All chapters in lesson order.
pub fn chapters() -> &'static [Chapter] {
    &CHAPTERS
}
