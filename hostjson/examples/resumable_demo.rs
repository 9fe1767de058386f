// SPDX-License-Identifier: Apache-2.0

// Example driving a stringify step by step, the way a host interpreter would

use hostjson::{parse, Error, Function, Indent, NativeInvoker, Replacer, Resumable, Step, Stringifier, Value};

fn main() -> Result<(), Error> {
    let json = r#"{"name": "value", "number": 42, "tags": ["a", "b"]}"#;
    let value = parse(json.as_bytes(), None, &mut NativeInvoker::new())?;
    println!("Input: {}", json);

    // The replacer is a host handle: the engine only asks for it to be run.
    let replacer = Replacer::Function(Function::host("upper", 1));
    let mut machine = Stringifier::new(value, &replacer, &Indent::spaces(2))?;

    let mut retval = None;
    let text = loop {
        match machine.resume(retval.take())? {
            Step::Done(text) => break text,
            Step::Call(call) => {
                println!("Call {:?} with key {:?}", call.function, call.args[0]);
                retval = Some(match &call.args[1] {
                    Value::String(s) => Value::from(s.to_string().to_uppercase()),
                    other => other.clone(),
                });
            }
        }
    };

    match text {
        Some(text) => println!("{}", text),
        None => println!("undefined"),
    }
    Ok(())
}
